pub mod agent;
pub mod config;
pub mod conversation;
pub mod errors;
pub mod form;
pub mod guidance;
pub mod models;
pub mod preferences;
pub mod routes;
pub mod service;
pub mod session;

use axum::{routing::get, routing::post, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::routes::api_routes::{chat_handler, health_handler, list_models_handler};
use crate::service::chat_service::RelayService;

/// Builds the relay router around a configured [`RelayService`].
pub fn create_router(service: RelayService) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/models", get(list_models_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}
