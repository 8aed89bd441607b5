use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::TextGenerator;
use crate::config::{normalize_base_url, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::errors::AppError;
use crate::models::{Turn, TurnRole};

/// Placeholder substituted for the credential in anything that gets logged
/// or returned to a caller.
pub const REDACTED_CREDENTIAL: &str = "HIDDEN_KEY";

/// Replaces every occurrence of `credential` in `text` with a placeholder.
pub fn redact_credential(text: &str, credential: &str) -> String {
    if credential.is_empty() {
        return text.to_string();
    }
    text.replace(credential, REDACTED_CREDENTIAL)
}

// ── Wire format ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
}

fn wire_role(role: TurnRole) -> &'static str {
    match role {
        TurnRole::User => "user",
        TurnRole::Assistant => "model",
    }
}

fn to_request(turns: &[Turn]) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: turns
            .iter()
            .map(|t| Content {
                role: wire_role(t.role),
                parts: vec![Part { text: &t.content }],
            })
            .collect(),
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Client for the Gemini `generateContent` REST endpoint.
///
/// Cheap to clone; the relay builds one per request around a shared
/// [`reqwest::Client`] because model, base URL and credential vary per call.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &REDACTED_CREDENTIAL)
            .finish()
    }
}

impl GeminiClient {
    /// Empty `base_url` or `model` fall back to the official endpoint and
    /// the default model.
    pub fn new(http: reqwest::Client, base_url: &str, model: &str, api_key: &str) -> Self {
        let base_url = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL.to_string()
        } else {
            normalize_base_url(base_url)
        };
        let model = if model.trim().is_empty() { DEFAULT_MODEL } else { model.trim() };
        Self {
            http,
            base_url,
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn redact(&self, text: &str) -> String {
        redact_credential(text, &self.api_key)
    }

    fn transport_error(&self, err: reqwest::Error) -> AppError {
        AppError::UpstreamUnavailable {
            model: self.model.clone(),
            message: self.redact(&err.without_url().to_string()),
        }
    }

    /// Lists the model names the credential can see, without the `models/`
    /// prefix.
    pub async fn list_models(&self) -> Result<Vec<String>, AppError> {
        let url = format!("{}/v1beta/models?key={}", self.base_url, self.api_key);
        info!("Listing models from: {}", self.redact(&url));

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let body = self.read_success_body(response, &url).await?;
        let parsed: ListModelsResponse =
            serde_json::from_str(&body).map_err(|e| AppError::InvalidResponse {
                model: self.model.clone(),
                message: e.to_string(),
            })?;

        Ok(parsed
            .models
            .into_iter()
            .map(|m| m.name.trim_start_matches("models/").to_string())
            .collect())
    }

    /// Returns the body of a 2xx response, or the upstream error with its
    /// status and message.
    async fn read_success_body(
        &self,
        response: reqwest::Response,
        url: &str,
    ) -> Result<String, AppError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|env| env.error)
            .and_then(|detail| detail.message)
            .unwrap_or_else(|| {
                format!(
                    "HTTP Error {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
                .trim_end()
                .to_string()
            });
        let failed_url = self.redact(url);
        error!(
            status = status.as_u16(),
            model = %self.model,
            url = %failed_url,
            "Gemini REST API error response: {}",
            self.redact(&body)
        );

        Err(AppError::UpstreamStatus {
            status: status.as_u16(),
            model: self.model.clone(),
            message: self.redact(&message),
            failed_url,
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, turns: &[Turn]) -> Result<String, AppError> {
        let url = self.generate_url();
        info!(model = %self.model, "Sending request to: {}", self.redact(&url));

        let response = self
            .http
            .post(&url)
            .json(&to_request(turns))
            .send()
            .await
            .map_err(|e| {
                let err = self.transport_error(e);
                error!("Gemini request failed: {err}");
                err
            })?;

        let body = self.read_success_body(response, &url).await?;
        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| AppError::InvalidResponse {
                model: self.model.clone(),
                message: e.to_string(),
            })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| AppError::EmptyResponse { model: self.model.clone() })?;

        debug!(model = %self.model, chars = text.len(), "Gemini response received");
        Ok(text)
    }
}
