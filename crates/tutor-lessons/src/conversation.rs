//! Conversation assembly for the upstream completion API.
//!
//! Builds the ordered prompt sequence: the fixed system prompt first, then
//! at most one orchestration instruction, then at most one lesson seed,
//! then the sanitized client history in original order. Clients can never
//! place a system message anywhere in the sequence.

use crate::catalog::{Catalog, SYSTEM_PROMPT};
use crate::message::{ClientMessage, Message};

/// Auxiliary instruction pushed when the client asks for an easier pass
/// over the current topic.
const REMEDIATE_INSTRUCTION: &str = "The learner is struggling with the current topic. Provide an easier explanation, simplify the steps, and show a very small example with exact numbers. Break it down into smaller pieces.";

/// Auxiliary instruction pushed when the client asks to move ahead.
const ADVANCE_INSTRUCTION: &str = "The learner has mastered the current concept. Introduce the next concept in the syllabus with one micro-exercise and then a short 3-question quiz.";

/// Orchestration mode selecting an auxiliary instruction inserted before
/// the lesson seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// No orchestration instruction (default).
    #[default]
    Normal,
    /// Re-teach the current topic more gently.
    Remediate,
    /// Move on to the next topic.
    Advance,
}

impl Mode {
    /// Parses a client-supplied mode string, case-insensitively.
    ///
    /// Missing or unrecognized values fall back to [`Mode::Normal`]:
    /// malformed payloads are filtered, never rejected.
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        value
            .and_then(Self::from_str_case_insensitive)
            .unwrap_or_default()
    }

    /// Parses a mode string into a known variant, case-insensitively.
    fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "remediate" => Some(Self::Remediate),
            "advance" => Some(Self::Advance),
            _ => None,
        }
    }

    /// Returns the fixed orchestration instruction for this mode, if any.
    #[must_use]
    pub const fn instruction(self) -> Option<&'static str> {
        match self {
            Self::Normal => None,
            Self::Remediate => Some(REMEDIATE_INSTRUCTION),
            Self::Advance => Some(ADVANCE_INSTRUCTION),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Remediate => write!(f, "remediate"),
            Self::Advance => write!(f, "advance"),
        }
    }
}

/// Builds the upstream-bound message list.
///
/// The output always begins with exactly one system message. The
/// orchestration instruction and lesson seed, when present, are injected
/// as user turns in that order. An unknown `lesson_id` is silently
/// ignored. Client history is sanitized: only user/assistant roles with
/// non-empty text survive, in their original order.
#[must_use]
pub fn build_messages(
    history: &[ClientMessage],
    lesson_id: Option<&str>,
    mode: Mode,
    catalog: &Catalog,
) -> Vec<Message> {
    let mut messages = vec![Message::system(SYSTEM_PROMPT)];

    if let Some(instruction) = mode.instruction() {
        messages.push(Message::user(instruction));
    }

    if let Some(lesson) = lesson_id.and_then(|id| catalog.lesson(id)) {
        messages.push(Message::user(lesson.seed));
    }

    messages.extend(history.iter().filter_map(ClientMessage::sanitize));
    messages
}
