//! Text-generation backends: the direct Gemini client and the relay client.

mod gemini;
mod relay_client;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::Turn;

pub use gemini::{redact_credential, GeminiClient, REDACTED_CREDENTIAL};
pub use relay_client::RelayClient;

/// Anything that turns an ordered list of turns into one generated reply.
///
/// Implementations send a single non-streaming request and never retry;
/// retry policy belongs to the caller.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    async fn generate(&self, turns: &[Turn]) -> Result<String, AppError>;

    /// `generate` over `history ++ [message as a user turn]`.
    async fn chat(&self, history: &[Turn], message: &str) -> Result<String, AppError> {
        let mut turns = Vec::with_capacity(history.len() + 1);
        turns.extend_from_slice(history);
        turns.push(Turn::user(message));
        self.generate(&turns).await
    }
}
