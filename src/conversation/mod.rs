//! Conversation store and the assembly of what gets submitted each round.

pub mod prompts;

use crate::models::Turn;

/// Append-only, in-memory turn history for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// A conversation opened by the assistant greeting.
    pub fn with_greeting() -> Self {
        Self { turns: vec![Turn::assistant(prompts::GREETING)] }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// The synthetic instruction/acknowledgment pair standing in for a system
/// prompt, which the generation service has no native slot for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framing {
    pub instruction: String,
    pub acknowledgment: String,
}

impl Default for Framing {
    fn default() -> Self {
        Self::swot()
    }
}

impl Framing {
    pub fn new(instruction: impl Into<String>, acknowledgment: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            acknowledgment: acknowledgment.into(),
        }
    }

    pub fn swot() -> Self {
        Self::new(prompts::SWOT_INSTRUCTION, prompts::SWOT_ACKNOWLEDGMENT)
    }

    /// `[instruction, acknowledgment, ...history, new_message]`.
    ///
    /// The pair is resent on every round; nothing is memoized, so the
    /// submission grows linearly with the history.
    pub fn assemble(&self, history: &[Turn], new_message: &str) -> Vec<Turn> {
        let mut turns = Vec::with_capacity(history.len() + 3);
        turns.push(Turn::user(self.instruction.clone()));
        turns.push(Turn::assistant(self.acknowledgment.clone()));
        turns.extend_from_slice(history);
        turns.push(Turn::user(new_message));
        turns
    }
}
