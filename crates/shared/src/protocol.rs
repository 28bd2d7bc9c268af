use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::Movie;

/// Reserved keyword recognized by the backend as a control command on the
/// chat channel rather than as free text.
pub const RESET_COMMAND: &str = "reset";

pub const CHAT_PATH: &str = "/chat";
pub const RECOMMEND_PATH: &str = "/recommend";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn reset() -> Self {
        Self::new(RESET_COMMAND)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    /// Set once the backend has collected every answer it needs.
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    #[serde(default)]
    pub answers: HashMap<String, String>,
    pub movies: Vec<Movie>,
}
