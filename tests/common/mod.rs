//! Fake chat backend used by the integration tests.
//!
//! Mirrors the backend contract: `POST /api/refresh_session`,
//! `GET /api/stream` with an event stream terminated by `[DONE]`, and the
//! `GET /test` liveness check. The answer is picked by the question text.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use futures::StreamExt;

/// Question whose stream sends one chunk and then hangs.
pub const SLOW_QUESTION: &str = "slow";
/// Question whose stream is cut before the end marker.
pub const DROPPED_QUESTION: &str = "drop";
/// Question whose answer is sent with a character split across body frames.
pub const SPLIT_UTF8_QUESTION: &str = "utf8";

#[derive(Debug, Default)]
pub struct FakeBackendState {
    pub refreshes: AtomicUsize,
    pub questions: Mutex<Vec<(String, String)>>,
}

#[derive(Debug, Clone)]
pub struct FakeBackend {
    pub addr: SocketAddr,
    pub state: Arc<FakeBackendState>,
}

impl FakeBackend {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn refreshes(&self) -> usize {
        self.state.refreshes.load(Ordering::SeqCst)
    }

    pub fn questions(&self) -> Vec<(String, String)> {
        self.state.questions.lock().unwrap().clone()
    }
}

/// Bind the fake backend to an ephemeral port.
pub async fn spawn_fake_backend() -> FakeBackend {
    let state = Arc::new(FakeBackendState::default());
    let app = Router::new()
        .route("/test", get(|| async { Json(serde_json::json!({"message": "API is working", "status": "success"})) }))
        .route("/api/refresh_session", post(refresh_session))
        .route("/api/stream", get(stream))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeBackend { addr, state }
}

async fn refresh_session(State(state): State<Arc<FakeBackendState>>) -> Json<serde_json::Value> {
    let n = state.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
    Json(serde_json::json!({ "session_id": format!("session-{n}") }))
}

async fn stream(
    State(state): State<Arc<FakeBackendState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(session_id) = params.get("session_id").filter(|s| !s.is_empty()) else {
        return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({"error": "No active session"}))).into_response();
    };
    let Some(question) = params.get("question").filter(|s| !s.is_empty()) else {
        return (StatusCode::PAYMENT_REQUIRED, Json(serde_json::json!({"error": "No question provided"}))).into_response();
    };
    state
        .questions
        .lock()
        .unwrap()
        .push((session_id.clone(), question.clone()));

    let body = match question.as_str() {
        SLOW_QUESTION => {
            let first = futures::stream::once(async { Ok::<_, Infallible>("data: thinking\n\n".to_string()) });
            Body::from_stream(first.chain(futures::stream::pending()))
        }
        DROPPED_QUESTION => Body::from("data: Hel\n\n"),
        SPLIT_UTF8_QUESTION => {
            // "こん" is E3 81 93 E3 82 93; the first frame ends mid-character.
            let frames: Vec<Result<Bytes, Infallible>> = vec![
                Ok(Bytes::from_static(b"data: \xE3\x81")),
                Ok(Bytes::from_static(b"\x93\xE3\x82\x93\n\n")),
                Ok(Bytes::from_static("data: にちは\n\ndata: [DONE]\n\n".as_bytes())),
            ];
            Body::from_stream(futures::stream::iter(frames))
        }
        "spaces" => Body::from("data: Hello\n\ndata:  world<br>again\n\ndata: [DONE]\n\n"),
        _ => Body::from("data: He\n\ndata: llo\n\ndata: [DONE]\n\n"),
    };

    Response::builder()
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(body)
        .unwrap()
}
