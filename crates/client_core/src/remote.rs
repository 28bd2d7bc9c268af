//! Remote service seam between the session controller and the backend.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    error::RemoteError,
    protocol::{
        ChatRequest, ChatResponse, RecommendResponse, CHAT_PATH, RECOMMEND_PATH, RESET_COMMAND,
    },
};
use tracing::{debug, warn};

#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn send_message(&self, message: &str) -> Result<ChatResponse, RemoteError>;

    /// Recommendations are derived from conversation state held server-side.
    async fn recommend(&self) -> Result<RecommendResponse, RemoteError>;

    async fn reset_session(&self) -> Result<ChatResponse, RemoteError> {
        self.send_message(RESET_COMMAND).await
    }
}

pub struct HttpRemoteService {
    http: Client,
    api_base: String,
}

impl HttpRemoteService {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self::with_client(Client::new(), api_base)
    }

    pub fn with_client(http: Client, api_base: impl Into<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        Self { http, api_base }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    async fn post_chat(&self, request: &ChatRequest) -> Result<ChatResponse, RemoteError> {
        let url = self.endpoint(CHAT_PATH);
        debug!(endpoint = %url, "remote: sending chat message");
        let res = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        decode(&url, res).await
    }
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn send_message(&self, message: &str) -> Result<ChatResponse, RemoteError> {
        self.post_chat(&ChatRequest::new(message)).await
    }

    async fn recommend(&self) -> Result<RecommendResponse, RemoteError> {
        let url = self.endpoint(RECOMMEND_PATH);
        debug!(endpoint = %url, "remote: requesting recommendations");
        let res = self.http.get(&url).send().await.map_err(transport)?;
        decode(&url, res).await
    }

    async fn reset_session(&self) -> Result<ChatResponse, RemoteError> {
        self.post_chat(&ChatRequest::reset()).await
    }
}

async fn decode<T: DeserializeOwned>(url: &str, res: Response) -> Result<T, RemoteError> {
    let status = res.status();
    let body = res.bytes().await.map_err(transport)?;

    if !status.is_success() {
        let err = RemoteError::status(status.as_u16(), &body);
        warn!(endpoint = %url, status = status.as_u16(), detail = ?err.detail(), "remote: call rejected");
        return Err(err);
    }

    serde_json::from_slice(&body).map_err(|e| {
        warn!(endpoint = %url, error = %e, "remote: undecodable response body");
        RemoteError::Malformed(e.to_string())
    })
}

fn transport(err: reqwest::Error) -> RemoteError {
    warn!(error = %err, "remote: transport failure");
    RemoteError::Transport(err.to_string())
}

#[cfg(test)]
#[path = "tests/remote_tests.rs"]
mod tests;
