use tracing::{info, warn};

use swot_assistant::config::{CredentialSource, RelayConfig};
use swot_assistant::create_router;
use swot_assistant::service::chat_service::RelayService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (development convenience)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swot_assistant=debug,tower_http=debug".into()),
        )
        .init();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config = RelayConfig::from_env()?;
    info!(
        model = %config.default_model,
        base_url = %config.base_url,
        credential_source = ?config.credential_source,
        "Relay configuration loaded"
    );
    if config.credential_source == CredentialSource::CallerSupplied && config.api_key.is_none() {
        warn!("No server-held GEMINI_API_KEY; every request must carry its own apiKey");
    }

    // ── Router ────────────────────────────────────────────────────────────────
    let port = config.port;
    let app = create_router(RelayService::new(config));

    // ── Listen ────────────────────────────────────────────────────────────────
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running on http://{addr}/");

    axum::serve(listener, app).await?;
    Ok(())
}
