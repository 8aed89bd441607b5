//! Relay configuration, read from the environment (`.env` is loaded by `main`).

use crate::errors::AppError;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_PORT: u16 = 3001;

/// Where the relay takes the Gemini credential from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Always the server-held key; keys sent by callers are ignored.
    ServerManaged,
    /// The caller's `apiKey`, falling back to the server-held key if any.
    CallerSupplied,
}

impl std::str::FromStr for CredentialSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "server" | "server_managed" | "servermanaged" => Ok(CredentialSource::ServerManaged),
            "caller" | "caller_supplied" | "callersupplied" => Ok(CredentialSource::CallerSupplied),
            other => Err(AppError::config(format!(
                "CREDENTIAL_SOURCE must be 'server' or 'caller', got '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub api_key: Option<String>,
    pub default_model: String,
    pub base_url: String,
    pub credential_source: CredentialSource,
    /// Honour a per-request `baseUrl` even when the server key is used.
    pub allow_base_url_override: bool,
    pub port: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            credential_source: CredentialSource::ServerManaged,
            allow_base_url_override: false,
            port: DEFAULT_PORT,
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let credential_source = match non_blank("CREDENTIAL_SOURCE") {
            Some(raw) => raw.parse()?,
            None => CredentialSource::ServerManaged,
        };

        let api_key = non_blank("GEMINI_API_KEY").map(|k| k.trim().to_string());
        if credential_source == CredentialSource::ServerManaged && api_key.is_none() {
            return Err(AppError::config(
                "GEMINI_API_KEY must be set when CREDENTIAL_SOURCE is 'server'",
            ));
        }

        let allow_base_url_override = match non_blank("ALLOW_BASE_URL_OVERRIDE") {
            Some(raw) => parse_flag(&raw)?,
            None => false,
        };

        let port = match non_blank("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AppError::config(format!("PORT must be a port number, got '{raw}'")))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            api_key,
            default_model: non_blank("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: normalize_base_url(
                non_blank("GEMINI_BASE_URL").as_deref().unwrap_or(DEFAULT_BASE_URL),
            ),
            credential_source,
            allow_base_url_override,
            port,
        })
    }
}

/// Strips trailing slashes so paths can be appended with a single `/`.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn parse_flag(raw: &str) -> Result<bool, AppError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(AppError::config(format!("expected a boolean flag, got '{other}'"))),
    }
}
