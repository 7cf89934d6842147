//! Chat message model.
//!
//! Messages exist in two forms: the loosely-typed [`ClientMessage`] as
//! received from the browser, and the well-formed [`Message`] forwarded
//! upstream and stored in history. Sanitization is the only way to turn
//! one into the other, which keeps role admission in a single place.

use serde::{Deserialize, Serialize};

/// The author of a chat message.
///
/// Clients may only contribute `User` and `Assistant` turns; `System` is
/// reserved for the server-side prompt assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Server-injected instruction role.
    System,
    /// The learner.
    User,
    /// The tutor model.
    Assistant,
}

impl Role {
    /// Returns `true` if clients are allowed to submit messages with this role.
    #[must_use]
    pub const fn is_client_role(self) -> bool {
        matches!(self, Self::User | Self::Assistant)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single ordered chat turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who authored the turn.
    pub role: Role,
    /// The text of the turn.
    pub content: String,
}

impl Message {
    /// Creates a message with the given role and content.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A message as received from the client, before sanitization.
///
/// Both fields are deliberately loose: a missing or unknown role and
/// non-text content cause the message to be dropped during sanitization
/// rather than the request being rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientMessage {
    /// Claimed role; only `"user"` and `"assistant"` are admitted.
    #[serde(default)]
    pub role: Option<String>,

    /// Raw content; scalar JSON values are coerced to text.
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

impl ClientMessage {
    /// Convenience constructor for tests and native callers.
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
            content: Some(serde_json::Value::String(content.into())),
        }
    }

    /// Converts this into a well-formed [`Message`].
    ///
    /// Returns `None` when the role is not a client role or the content
    /// does not coerce to non-empty text. The system role is never
    /// admitted from a client, regardless of content.
    #[must_use]
    pub fn sanitize(&self) -> Option<Message> {
        let role = match self.role.as_deref() {
            Some("user") => Role::User,
            Some("assistant") => Role::Assistant,
            _ => return None,
        };
        let content = coerce_text(self.content.as_ref()?)?;
        Some(Message { role, content })
    }
}

/// Coerces scalar JSON content to text.
///
/// Strings pass through unchanged; numbers and booleans are stringified.
/// Null, blank strings, arrays, and objects yield `None` and the message
/// is dropped.
fn coerce_text(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
