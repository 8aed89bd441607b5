//! The user-facing surfaces: guided chat, auto-generate and review.
//!
//! Each surface owns its own [`BusyGate`], so at most one request is in
//! flight per surface and a second action while pending is a no-op.

mod gate;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

pub use gate::{BusyGate, BusyGuard, GateState};

use crate::agent::TextGenerator;
use crate::conversation::{prompts, Conversation, Framing};
use crate::form::{format_response, FormAnswers, FormDescriptor, FormExtractor, GeneratedReply};
use crate::guidance::GuidanceTable;
use crate::models::{Turn, TurnRole};

/// Result of one user action on a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Blank input; nothing was sent.
    Ignored,
    /// Another request from this surface is still pending; nothing was sent.
    Busy,
    Completed(T),
    /// The request failed; carries the user-facing guidance text.
    Failed(String),
}

/// Step-by-step SWOT interview driven by forms embedded in the replies.
pub struct GuidedSession {
    generator: Arc<dyn TextGenerator>,
    framing: Framing,
    extractor: FormExtractor,
    guidance: GuidanceTable,
    conversation: Mutex<Conversation>,
    gate: BusyGate,
}

impl GuidedSession {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            framing: Framing::default(),
            extractor: FormExtractor::default(),
            guidance: GuidanceTable::default(),
            conversation: Mutex::new(Conversation::with_greeting()),
            gate: BusyGate::new(),
        }
    }

    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_extractor(mut self, extractor: FormExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_guidance(mut self, guidance: GuidanceTable) -> Self {
        self.guidance = guidance;
        self
    }

    fn conversation(&self) -> MutexGuard<'_, Conversation> {
        self.conversation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> GateState {
        self.gate.state()
    }

    /// Snapshot of the history.
    pub fn turns(&self) -> Vec<Turn> {
        self.conversation().turns().to_vec()
    }

    /// The last assistant turn split into narrative and form.
    pub fn latest_reply(&self) -> Option<GeneratedReply> {
        self.conversation()
            .turns()
            .iter()
            .rev()
            .find(|t| t.role == TurnRole::Assistant)
            .map(|t| self.extractor.extract(&t.content))
    }

    pub async fn send_message(&self, text: &str) -> Outcome<GeneratedReply> {
        let text = text.trim();
        if text.is_empty() {
            return Outcome::Ignored;
        }
        let Some(_guard) = self.gate.try_begin() else {
            return Outcome::Busy;
        };

        let history = self.turns();
        self.conversation().append(Turn::user(text));
        let submission = self.framing.assemble(&history, text);

        match self.generator.generate(&submission).await {
            Ok(raw) => {
                self.conversation().append(Turn::assistant(raw.clone()));
                Outcome::Completed(self.extractor.extract(&raw))
            }
            Err(e) => {
                warn!("Guided session request failed: {e}");
                let guidance = self.guidance.describe_error(&e);
                self.conversation().append(Turn::assistant(guidance.clone()));
                Outcome::Failed(guidance)
            }
        }
    }

    /// Formats the answers into one user turn and sends it.
    pub async fn submit_form(
        &self,
        form: &FormDescriptor,
        answers: &FormAnswers,
    ) -> Outcome<GeneratedReply> {
        let response = format_response(form, answers);
        self.send_message(&response).await
    }
}

/// A single-prompt surface: the input is wrapped in a fixed prompt and sent
/// without any history.
pub struct OneShotSurface {
    name: &'static str,
    prompt: fn(&str) -> String,
    generator: Arc<dyn TextGenerator>,
    guidance: GuidanceTable,
    gate: BusyGate,
}

impl OneShotSurface {
    /// Generates a full SWOT template for a topic.
    pub fn auto_generate(generator: Arc<dyn TextGenerator>) -> Self {
        Self::new("auto-generate", prompts::auto_generate_prompt, generator)
    }

    /// Organises and critiques the user's loose notes.
    pub fn review(generator: Arc<dyn TextGenerator>) -> Self {
        Self::new("review", prompts::review_prompt, generator)
    }

    fn new(
        name: &'static str,
        prompt: fn(&str) -> String,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            name,
            prompt,
            generator,
            guidance: GuidanceTable::default(),
            gate: BusyGate::new(),
        }
    }

    pub fn with_guidance(mut self, guidance: GuidanceTable) -> Self {
        self.guidance = guidance;
        self
    }

    pub fn state(&self) -> GateState {
        self.gate.state()
    }

    pub async fn run(&self, input: &str) -> Outcome<String> {
        let input = input.trim();
        if input.is_empty() {
            return Outcome::Ignored;
        }
        let Some(_guard) = self.gate.try_begin() else {
            return Outcome::Busy;
        };

        info!(surface = self.name, model = self.generator.model(), "Running one-shot prompt");
        let turns = [Turn::user((self.prompt)(input))];
        match self.generator.generate(&turns).await {
            Ok(text) => Outcome::Completed(text),
            Err(e) => {
                warn!(surface = self.name, "One-shot request failed: {e}");
                Outcome::Failed(self.guidance.describe_error(&e))
            }
        }
    }
}
