use super::*;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct BackendState {
    received: Arc<Mutex<Vec<ChatRequest>>>,
}

async fn handle_chat(
    State(state): State<BackendState>,
    Json(request): Json<ChatRequest>,
) -> Json<serde_json::Value> {
    let reply = if request.message == "reset" {
        "reset done, type start".to_string()
    } else {
        format!("echo: {}", request.message)
    };
    state.received.lock().await.push(request);
    Json(serde_json::json!({ "reply": reply, "done": false }))
}

async fn handle_recommend() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "answers": { "mood": "happy", "genre": "Comedy", "year": "any" },
        "movies": [
            { "title": "Paddington 2", "year": "2017", "rating": 7.6, "poster": "https://img/p2.jpg" },
            { "title": "Untitled", "year": "", "rating": null, "poster": null }
        ]
    }))
}

async fn spawn_backend(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}/api")
}

async fn spawn_happy_backend() -> (String, BackendState) {
    let state = BackendState::default();
    let router = Router::new()
        .route("/api/chat", post(handle_chat))
        .route("/api/recommend", get(handle_recommend))
        .with_state(state.clone());
    (spawn_backend(router).await, state)
}

#[tokio::test]
async fn send_message_posts_json_and_decodes_reply() {
    let (api_base, state) = spawn_happy_backend().await;
    let remote = HttpRemoteService::new(format!("{api_base}/"));
    assert_eq!(remote.api_base(), api_base);

    let response = remote.send_message("start").await.expect("reply");
    assert_eq!(response.reply, "echo: start");
    assert!(!response.done);
    assert_eq!(
        state.received.lock().await.as_slice(),
        &[ChatRequest::new("start")]
    );
}

#[tokio::test]
async fn reset_session_sends_reserved_keyword() {
    let (api_base, state) = spawn_happy_backend().await;
    let remote = HttpRemoteService::new(api_base);

    let response = remote.reset_session().await.expect("reply");
    assert_eq!(response.reply, "reset done, type start");
    assert_eq!(state.received.lock().await[0].message, "reset");
}

#[tokio::test]
async fn recommend_decodes_lenient_movies() {
    let (api_base, _state) = spawn_happy_backend().await;
    let remote = HttpRemoteService::new(api_base);

    let response = remote.recommend().await.expect("movies");
    assert_eq!(response.movies.len(), 2);
    assert_eq!(response.movies[0].year, Some(2017));
    assert_eq!(response.movies[1].year, None);
    assert_eq!(response.movies[1].poster, None);
    assert_eq!(response.answers.get("genre").map(String::as_str), Some("Comedy"));
}

#[tokio::test]
async fn error_status_surfaces_detail() {
    let router = Router::new().route(
        "/api/recommend",
        get(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "detail": "answer the questions first" })),
            )
        }),
    );
    let remote = HttpRemoteService::new(spawn_backend(router).await);

    let err = remote.recommend().await.expect_err("must fail");
    assert_eq!(
        err,
        RemoteError::Status {
            status: 400,
            detail: Some("answer the questions first".to_string()),
        }
    );
}

#[tokio::test]
async fn undecodable_success_body_is_malformed() {
    let router = Router::new().route("/api/chat", post(|| async { "not json" }));
    let remote = HttpRemoteService::new(spawn_backend(router).await);

    let err = remote.send_message("hi").await.expect_err("must fail");
    assert!(matches!(err, RemoteError::Malformed(_)), "unexpected: {err:?}");
}

#[tokio::test]
async fn unreachable_backend_is_transport_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let remote = HttpRemoteService::new(format!("http://{addr}/api"));

    let err = remote.send_message("hi").await.expect_err("must fail");
    assert!(matches!(err, RemoteError::Transport(_)), "unexpected: {err:?}");
    assert_eq!(err.detail(), None);
}
