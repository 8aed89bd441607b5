use thiserror::Error;

/// Top-level application error.
/// All variants carry a human-readable message for display/logging; none of
/// them ever carries a credential.
#[derive(Debug, Error)]
pub enum AppError {
    // ── Validation errors ────────────────────────────────────────────────────
    #[error("Invalid messages format: {reason}")]
    InvalidMessages { reason: String },

    #[error("Field '{field_name}' cannot be empty")]
    EmptyField { field_name: String },

    #[error("Missing API Key configuration")]
    MissingCredential,

    // ── Upstream (Gemini) errors ─────────────────────────────────────────────
    #[error("Gemini request for model '{model}' failed: {message}")]
    UpstreamUnavailable { model: String, message: String },

    #[error("Gemini API error (HTTP {status}) for model '{model}': {message}")]
    UpstreamStatus {
        status: u16,
        model: String,
        message: String,
        /// Request URL with the credential replaced by a placeholder.
        failed_url: String,
    },

    #[error("Empty response from Gemini API for model '{model}'")]
    EmptyResponse { model: String },

    #[error("Unreadable response from Gemini API for model '{model}': {message}")]
    InvalidResponse { model: String, message: String },

    // ── Relay client errors ──────────────────────────────────────────────────
    /// `status` is the relay's own HTTP status; `upstream_status` is what
    /// Gemini answered the relay with, when it got that far.
    #[error("{message}")]
    Relay {
        status: Option<u16>,
        upstream_status: Option<u16>,
        model: String,
        message: String,
    },

    // ── Configuration & preference storage ───────────────────────────────────
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error("Preference file '{path}' could not be accessed")]
    PreferenceIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Preference file '{path}' is not valid JSON")]
    PreferenceFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // ── System errors ────────────────────────────────────────────────────────
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn invalid_messages(reason: impl Into<String>) -> Self {
        AppError::InvalidMessages { reason: reason.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config { message: message.into() }
    }

    /// HTTP status Gemini answered with, when one is known.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::UpstreamStatus { status, .. } => Some(*status),
            AppError::Relay { upstream_status, .. } => *upstream_status,
            _ => None,
        }
    }

    /// Model identifier that was being called when the error happened.
    pub fn model(&self) -> Option<&str> {
        match self {
            AppError::UpstreamUnavailable { model, .. }
            | AppError::UpstreamStatus { model, .. }
            | AppError::EmptyResponse { model }
            | AppError::InvalidResponse { model, .. }
            | AppError::Relay { model, .. } => Some(model),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::InvalidMessages { .. } | AppError::EmptyField { .. }
        )
    }
}
