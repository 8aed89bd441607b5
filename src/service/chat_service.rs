use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::agent::{GeminiClient, TextGenerator};
use crate::config::{normalize_base_url, CredentialSource, RelayConfig};
use crate::errors::AppError;
use crate::models::{ChatRequest, Turn};

/// Value the browser UI sends as `apiKey` when the server holds the key.
const SERVER_MANAGED_SENTINEL: &str = "SERVER_MANAGED";

/// Forwards chat requests to Gemini using the credential policy from
/// [`RelayConfig`]. Holds no mutable state; clones share the HTTP client.
#[derive(Clone)]
pub struct RelayService {
    config: Arc<RelayConfig>,
    http: reqwest::Client,
}

impl RelayService {
    pub fn new(config: RelayConfig) -> Self {
        Self::with_http_client(config, reqwest::Client::new())
    }

    pub fn with_http_client(config: RelayConfig, http: reqwest::Client) -> Self {
        Self { config: Arc::new(config), http }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Checks that `messages` is a non-empty list of `{role, content}` turns.
    pub fn validate_messages(messages: Option<&Value>) -> Result<Vec<Turn>, AppError> {
        let items = match messages {
            None | Some(Value::Null) => {
                return Err(AppError::invalid_messages("'messages' is required"))
            }
            Some(Value::Array(items)) => items,
            Some(_) => return Err(AppError::invalid_messages("'messages' must be a list")),
        };
        if items.is_empty() {
            return Err(AppError::invalid_messages("'messages' must not be empty"));
        }

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                serde_json::from_value::<Turn>(item.clone())
                    .map_err(|e| AppError::invalid_messages(format!("message {i}: {e}")))
            })
            .collect()
    }

    fn resolve_model(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(self.config.default_model.as_str())
            .to_string()
    }

    fn resolve_credential(&self, requested: Option<&str>) -> Result<String, AppError> {
        let server_key = self.config.api_key.clone();
        let key = match self.config.credential_source {
            CredentialSource::ServerManaged => server_key,
            CredentialSource::CallerSupplied => requested
                .map(str::trim)
                .filter(|k| !k.is_empty() && *k != SERVER_MANAGED_SENTINEL)
                .map(str::to_string)
                .or(server_key),
        };
        key.ok_or(AppError::MissingCredential)
    }

    fn resolve_base_url(&self, requested: Option<&str>) -> String {
        let override_allowed = self.config.allow_base_url_override
            || self.config.credential_source == CredentialSource::CallerSupplied;
        match requested.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) if override_allowed => normalize_base_url(url),
            Some(_) => {
                warn!("Ignoring per-request baseUrl; overrides are disabled");
                self.config.base_url.clone()
            }
            None => self.config.base_url.clone(),
        }
    }

    fn client(&self, base_url: &str, model: &str, api_key: &str) -> GeminiClient {
        GeminiClient::new(self.http.clone(), base_url, model, api_key)
    }

    /// Validates the request, forwards it and returns the generated text.
    pub async fn chat(&self, request: ChatRequest) -> Result<String, AppError> {
        let turns = Self::validate_messages(request.messages.as_ref())?;

        let model = self.resolve_model(request.model.as_deref());
        let api_key = self.resolve_credential(request.api_key.as_deref())?;
        let base_url = self.resolve_base_url(request.base_url.as_deref());
        info!(model = %model, turns = turns.len(), "Using model: {model}");

        self.client(&base_url, &model, &api_key).generate(&turns).await
    }

    /// Models visible to the server-held credential.
    pub async fn list_models(&self) -> Result<Vec<String>, AppError> {
        let api_key = self.config.api_key.as_deref().ok_or(AppError::MissingCredential)?;
        self.client(&self.config.base_url, &self.config.default_model, api_key)
            .list_models()
            .await
    }
}
