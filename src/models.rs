use serde::{Deserialize, Serialize};

/// Speaker of a turn. `ai` (the UI's internal token) and `model` (Gemini's
/// token) are accepted on input and normalized to `assistant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    #[serde(alias = "ai", alias = "model")]
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message exchanged in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub content: String,
}

impl Turn {
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }
}

/// Body of `POST /api/chat`.
///
/// `messages` stays untyped until the relay validates it so that a missing or
/// malformed list is reported as a structured client error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: String,
    /// Status Gemini answered with, when the failure came from upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_aliases_normalize_to_assistant() {
        let turns: Vec<Turn> = serde_json::from_str(
            r#"[{"role":"ai","content":"a"},{"role":"model","content":"b"},{"role":"user","content":"c"}]"#,
        )
        .unwrap();
        assert_eq!(turns[0].role, TurnRole::Assistant);
        assert_eq!(turns[1].role, TurnRole::Assistant);
        assert_eq!(turns[2].role, TurnRole::User);
        assert_eq!(
            serde_json::to_value(&turns[0]).unwrap(),
            serde_json::json!({"role": "assistant", "content": "a"})
        );
    }

    #[test]
    fn unknown_role_is_rejected() {
        assert!(serde_json::from_str::<Turn>(r#"{"role":"system","content":"x"}"#).is_err());
    }

    #[test]
    fn chat_request_reads_camel_case_keys() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"provider":"gemini","apiKey":"k","model":"m","baseUrl":"http://proxy","messages":[]}"#,
        )
        .unwrap();
        assert_eq!(req.api_key.as_deref(), Some("k"));
        assert_eq!(req.base_url.as_deref(), Some("http://proxy"));
        assert!(req.messages.unwrap().is_array());
    }
}
