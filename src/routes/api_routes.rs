use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ChatRequest, ChatResponse, ErrorResponse, ModelsResponse};
use crate::service::chat_service::RelayService;

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET `/` — plain-text liveness message
pub async fn health_handler() -> &'static str {
    "SWOT Analysis API Server is running! (SWOT 分析助手后台服务已启动)"
}

/// POST `/api/chat` — relays `{messages, model?, apiKey?, baseUrl?}` to Gemini
pub async fn chat_handler(
    State(svc): State<RelayService>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("chat", %request_id);

    async move {
        info!("Received chat request");
        let request = match payload {
            Ok(Json(request)) => request,
            Err(rejection) => {
                return error_response(&AppError::invalid_messages(rejection.body_text()));
            }
        };

        match svc.chat(request).await {
            Ok(content) => {
                info!("Gemini response received successfully");
                Json(ChatResponse { content }).into_response()
            }
            Err(err) => error_response(&err),
        }
    }
    .instrument(span)
    .await
}

/// GET `/api/models` — models visible to the server credential
pub async fn list_models_handler(State(svc): State<RelayService>) -> Response {
    match svc.list_models().await {
        Ok(models) => Json(ModelsResponse { models }).into_response(),
        Err(err) => error_response(&err),
    }
}

// ── Helper ────────────────────────────────────────────────────────────────────

fn error_response(err: &AppError) -> Response {
    let status = if err.is_validation() || matches!(err, AppError::MissingCredential) {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    if status.is_server_error() {
        error!("Relay request failed: {err}");
    } else {
        info!("Rejected relay request: {err}");
    }

    let body = ErrorResponse { error: err.to_string(), upstream_status: err.status() };
    (status, Json(body)).into_response()
}
