//! Test utilities for mutasi-core
//!
//! This module provides a mock OpenAI-compatible chat-completion server that can
//! be used for development and integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// What the mock server answers to every chat-completion request
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with this string as the message content
    Content(String),
    /// 200 with `"content": null`
    NullContent,
    /// Non-2xx status with a raw body
    Status(u16, String),
}

impl MockReply {
    pub fn content(content: impl Into<String>) -> Self {
        Self::Content(content.into())
    }

    /// 200 with `value` serialized as the message content
    pub fn json(value: Value) -> Self {
        Self::Content(value.to_string())
    }
}

/// A request captured by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub body: Value,
    pub authorization: Option<String>,
}

#[derive(Clone)]
struct ServerState {
    reply: MockReply,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Mock chat-completion server for testing and development
pub struct MockChatServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockChatServer {
    /// Start the mock server on an available port
    pub async fn start(reply: MockReply) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            reply,
            requests: requests.clone(),
        };

        let app = Router::new()
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat_completion))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            requests,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Chat-completion requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockChatServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Model list endpoint (health check)
async fn handle_models() -> Json<Value> {
    Json(json!({
        "object": "list",
        "data": [{"id": "gpt-4o-mini", "object": "model"}]
    }))
}

async fn handle_chat_completion(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());
    let model = body["model"].clone();

    state.requests.lock().unwrap().push(RecordedRequest {
        body,
        authorization,
    });

    let content = match state.reply {
        MockReply::Content(content) => Value::String(content),
        MockReply::NullContent => Value::Null,
        MockReply::Status(code, body) => {
            let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            return (status, body).into_response();
        }
    };

    Json(json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    }))
    .into_response()
}
