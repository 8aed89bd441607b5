use async_trait::async_trait;
use tracing::error;

use super::TextGenerator;
use crate::config::{normalize_base_url, DEFAULT_MODEL};
use crate::errors::AppError;
use crate::models::{ChatRequest, ChatResponse, ErrorResponse, Turn};

/// Caller side of `POST /api/chat`.
///
/// Forwards the provider settings the UI holds; which of them the relay
/// honours depends on its credential configuration.
#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    relay_url: String,
    provider: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

impl RelayClient {
    pub fn new(http: reqwest::Client, relay_url: &str) -> Self {
        Self {
            http,
            relay_url: normalize_base_url(relay_url),
            provider: Some("gemini".to_string()),
            api_key: None,
            model: None,
            base_url: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/api/chat", self.relay_url)
    }
}

#[async_trait]
impl TextGenerator for RelayClient {
    fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    async fn generate(&self, turns: &[Turn]) -> Result<String, AppError> {
        let messages = serde_json::to_value(turns)
            .map_err(|e| AppError::Unexpected(format!("Failed to encode messages: {e}")))?;
        let body = ChatRequest {
            provider: self.provider.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            messages: Some(messages),
        };

        let response = self
            .http
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Relay {
                status: None,
                upstream_status: None,
                model: self.model().to_string(),
                message: format!("Network error: {}", e.without_url()),
            })?;

        let status = response.status();
        if !status.is_success() {
            let (message, upstream_status) = match response.json::<ErrorResponse>().await {
                Ok(body) => (body.error, body.upstream_status),
                Err(_) => (format!("Server Error: {}", status.as_u16()), None),
            };
            error!("Server API Error: {message}");
            return Err(AppError::Relay {
                status: Some(status.as_u16()),
                upstream_status,
                model: self.model().to_string(),
                message,
            });
        }

        response
            .json::<ChatResponse>()
            .await
            .map(|b| b.content)
            .map_err(|e| AppError::Relay {
                status: Some(status.as_u16()),
                upstream_status: None,
                model: self.model().to_string(),
                message: format!("Parse error: {}", e.without_url()),
            })
    }
}
