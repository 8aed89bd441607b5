//! Integration tests for the relay HTTP API, driving the router directly and
//! pointing it at a fake upstream.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{closed_url, spawn_upstream, text_reply, upstream_error, SECRET_KEY};
use swot_assistant::config::{CredentialSource, RelayConfig};
use swot_assistant::create_router;
use swot_assistant::service::chat_service::RelayService;

// =============================================================================
// Helpers
// =============================================================================

fn server_config(base_url: &str) -> RelayConfig {
    RelayConfig {
        api_key: Some(SECRET_KEY.to_string()),
        default_model: "gemini-default".to_string(),
        base_url: base_url.to_string(),
        credential_source: CredentialSource::ServerManaged,
        ..RelayConfig::default()
    }
}

fn make_app(config: RelayConfig) -> axum::Router {
    create_router(RelayService::new(config))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: axum::Router, req: Request<Body>) -> (StatusCode, String) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn parse(body: &str) -> Value {
    serde_json::from_str(body).unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_returns_plain_text() {
    let app = make_app(server_config("http://unused"));
    let (status, body) = send(app, Request::get("/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("running"));
}

// =============================================================================
// POST /api/chat
// =============================================================================

#[tokio::test]
async fn test_chat_happy_path_translates_roles() {
    let upstream = spawn_upstream(StatusCode::OK, text_reply("你好，我们开始吧")).await;
    let app = make_app(server_config(&upstream.base_url));

    let body = json!({
        "provider": "gemini",
        "apiKey": "SERVER_MANAGED",
        "model": "gemini-test",
        "messages": [
            {"role": "user", "content": "rules"},
            {"role": "ai", "content": "ok"},
            {"role": "user", "content": "我想开咖啡店"}
        ]
    });
    let (status, text) = send(app, post_json("/api/chat", &body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&text), json!({"content": "你好，我们开始吧"}));

    let received = upstream.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].call.as_deref(), Some("gemini-test:generateContent"));
    assert_eq!(received[0].key.as_deref(), Some(SECRET_KEY));
    assert_eq!(
        received[0].body,
        json!({
            "contents": [
                {"role": "user", "parts": [{"text": "rules"}]},
                {"role": "model", "parts": [{"text": "ok"}]},
                {"role": "user", "parts": [{"text": "我想开咖啡店"}]}
            ]
        })
    );
}

#[tokio::test]
async fn test_chat_uses_default_model_when_none_given() {
    let upstream = spawn_upstream(StatusCode::OK, text_reply("ok")).await;
    let app = make_app(server_config(&upstream.base_url));

    let body = json!({"messages": [{"role": "user", "content": "hi"}]});
    let (status, _) = send(app, post_json("/api/chat", &body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        upstream.received()[0].call.as_deref(),
        Some("gemini-default:generateContent")
    );
}

#[tokio::test]
async fn test_chat_missing_messages_never_reaches_upstream() {
    let upstream = spawn_upstream(StatusCode::OK, text_reply("ok")).await;
    let app = make_app(server_config(&upstream.base_url));

    let (status, text) = send(app, post_json("/api/chat", r#"{"model":"m"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(parse(&text)["error"].as_str().unwrap().contains("required"));
    assert!(upstream.received().is_empty());
}

#[tokio::test]
async fn test_chat_messages_not_a_list_is_rejected() {
    let upstream = spawn_upstream(StatusCode::OK, text_reply("ok")).await;

    for messages in [json!("hello"), json!({"role": "user", "content": "x"}), json!(42)] {
        let app = make_app(server_config(&upstream.base_url));
        let body = json!({ "messages": messages });
        let (status, text) = send(app, post_json("/api/chat", &body.to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(parse(&text)["error"].as_str().unwrap().contains("must be a list"));
    }
    assert!(upstream.received().is_empty());
}

#[tokio::test]
async fn test_chat_malformed_body_is_a_client_error() {
    let app = make_app(server_config("http://unused"));
    let (status, text) = send(app, post_json("/api/chat", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(parse(&text)["error"].is_string());
}

#[tokio::test]
async fn test_chat_unknown_role_is_rejected() {
    let upstream = spawn_upstream(StatusCode::OK, text_reply("ok")).await;
    let app = make_app(server_config(&upstream.base_url));
    let body = json!({"messages": [{"role": "system", "content": "x"}]});
    let (status, _) = send(app, post_json("/api/chat", &body.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(upstream.received().is_empty());
}

#[tokio::test]
async fn test_chat_empty_candidates_is_a_server_error() {
    let upstream = spawn_upstream(StatusCode::OK, json!({"candidates": []})).await;
    let app = make_app(server_config(&upstream.base_url));

    let body = json!({"messages": [{"role": "user", "content": "hi"}]});
    let (status, text) = send(app, post_json("/api/chat", &body.to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = parse(&text)["error"].as_str().unwrap().to_string();
    assert!(error.contains("Empty response"));
    assert!(error.contains("gemini-default"));
    assert!(parse(&text).get("upstreamStatus").is_none());
}

#[tokio::test]
async fn test_chat_upstream_status_is_reported_without_credential() {
    let upstream = spawn_upstream(
        StatusCode::NOT_FOUND,
        upstream_error(404, "models/gemini-missing is not found for API version v1beta"),
    )
    .await;
    let app = make_app(server_config(&upstream.base_url));

    let body = json!({"model": "gemini-missing", "messages": [{"role": "user", "content": "hi"}]});
    let (status, text) = send(app, post_json("/api/chat", &body.to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let error = parse(&text)["error"].as_str().unwrap().to_string();
    assert!(error.contains("404"));
    assert!(error.contains("gemini-missing"));
    assert!(error.contains("is not found"));
    assert_eq!(parse(&text)["upstreamStatus"], 404);
    assert!(!text.contains(SECRET_KEY));
}

#[tokio::test]
async fn test_chat_upstream_unreachable_is_a_server_error() {
    let app = make_app(server_config(&closed_url().await));
    let body = json!({"messages": [{"role": "user", "content": "hi"}]});
    let (status, text) = send(app, post_json("/api/chat", &body.to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(parse(&text)["error"].as_str().unwrap().contains("gemini-default"));
    assert!(!text.contains(SECRET_KEY));
}

#[tokio::test]
async fn test_server_managed_ignores_caller_base_url() {
    let upstream = spawn_upstream(StatusCode::OK, text_reply("from configured base")).await;
    let app = make_app(server_config(&upstream.base_url));

    let body = json!({
        "baseUrl": closed_url().await,
        "apiKey": "caller-key",
        "messages": [{"role": "user", "content": "hi"}]
    });
    let (status, text) = send(app, post_json("/api/chat", &body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&text)["content"], "from configured base");
    assert_eq!(upstream.received()[0].key.as_deref(), Some(SECRET_KEY));
}

// =============================================================================
// Caller-supplied credentials
// =============================================================================

fn caller_config(base_url: &str) -> RelayConfig {
    RelayConfig {
        api_key: None,
        base_url: base_url.to_string(),
        credential_source: CredentialSource::CallerSupplied,
        ..RelayConfig::default()
    }
}

#[tokio::test]
async fn test_caller_supplied_key_and_base_url_are_used() {
    let upstream = spawn_upstream(StatusCode::OK, text_reply("via proxy")).await;
    let app = make_app(caller_config(&closed_url().await));

    let body = json!({
        "apiKey": "caller-key",
        "baseUrl": format!("{}/", upstream.base_url),
        "messages": [{"role": "user", "content": "hi"}]
    });
    let (status, text) = send(app, post_json("/api/chat", &body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&text)["content"], "via proxy");
    assert_eq!(upstream.received()[0].key.as_deref(), Some("caller-key"));
}

#[tokio::test]
async fn test_caller_mode_without_any_key_is_a_client_error() {
    let upstream = spawn_upstream(StatusCode::OK, text_reply("ok")).await;
    let app = make_app(caller_config(&upstream.base_url));

    let body = json!({"apiKey": "SERVER_MANAGED", "messages": [{"role": "user", "content": "hi"}]});
    let (status, text) = send(app, post_json("/api/chat", &body.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(parse(&text)["error"].as_str().unwrap().contains("API Key"));
    assert!(upstream.received().is_empty());
}

// =============================================================================
// GET /api/models
// =============================================================================

#[tokio::test]
async fn test_models_are_listed_without_prefix() {
    let upstream = spawn_upstream(
        StatusCode::OK,
        json!({"models": [
            {"name": "models/gemini-2.0-flash", "displayName": "Gemini 2.0 Flash"},
            {"name": "models/gemini-2.5-pro"}
        ]}),
    )
    .await;
    let app = make_app(server_config(&upstream.base_url));

    let (status, text) = send(app, Request::get("/api/models").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&text), json!({"models": ["gemini-2.0-flash", "gemini-2.5-pro"]}));
    assert_eq!(upstream.received()[0].key.as_deref(), Some(SECRET_KEY));
}

#[tokio::test]
async fn test_models_error_is_reported() {
    let upstream =
        spawn_upstream(StatusCode::FORBIDDEN, upstream_error(403, "API key not valid")).await;
    let app = make_app(server_config(&upstream.base_url));

    let (status, text) = send(app, Request::get("/api/models").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(parse(&text)["error"].as_str().unwrap().contains("403"));
    assert!(!text.contains(SECRET_KEY));
}
