//! Shared test helpers: a fake Gemini upstream served by axum on an
//! ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const SECRET_KEY: &str = "sk-test-SECRET-7f3a";

/// One request the fake upstream received.
#[derive(Debug, Clone)]
pub struct Received {
    /// Last path segment, e.g. `gemini-2.0-flash:generateContent`.
    pub call: Option<String>,
    pub key: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct UpstreamState {
    status: StatusCode,
    reply: Value,
    received: Arc<Mutex<Vec<Received>>>,
}

pub struct FakeUpstream {
    pub base_url: String,
    received: Arc<Mutex<Vec<Received>>>,
}

impl FakeUpstream {
    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}

async fn generate(
    State(state): State<UpstreamState>,
    Path(call): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.received.lock().unwrap().push(Received {
        call: Some(call),
        key: query.get("key").cloned(),
        body,
    });
    (state.status, Json(state.reply.clone()))
}

async fn list_models(
    State(state): State<UpstreamState>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.received.lock().unwrap().push(Received {
        call: None,
        key: query.get("key").cloned(),
        body: Value::Null,
    });
    (state.status, Json(state.reply.clone()))
}

/// Serves `router` on 127.0.0.1 and returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// Starts a fake upstream answering every call with `status` and `reply`.
pub async fn spawn_upstream(status: StatusCode, reply: Value) -> FakeUpstream {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = UpstreamState { status, reply, received: received.clone() };
    let router = Router::new()
        .route("/v1beta/models", get(list_models))
        .route("/v1beta/models/{call}", post(generate))
        .with_state(state);
    FakeUpstream { base_url: serve(router).await, received }
}

/// A URL nothing is listening on.
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn text_reply(text: &str) -> Value {
    json!({
        "candidates": [
            {"content": {"role": "model", "parts": [{"text": text}]}}
        ]
    })
}

pub fn upstream_error(code: u16, message: &str) -> Value {
    json!({"error": {"code": code, "message": message, "status": "ERROR"}})
}
