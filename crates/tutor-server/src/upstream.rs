//! Upstream completion API client.
//!
//! The primary call targets the Responses API; when it returns a
//! non-success status the client makes one fallback attempt against the
//! Chat Completions API before giving up. On a failed fallback the
//! original upstream status and detail are surfaced, not the fallback's.
//!
//! The client is stateless per request and holds no timeout beyond the
//! HTTP client defaults; there is no retry besides the single fallback
//! and no cancellation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use tutor_lessons::Message;

use crate::config::Config;
use crate::error::{Result, TutorError};

/// Reply used when the upstream response parses but carries no usable text.
pub const EMPTY_REPLY_FALLBACK: &str = "I could not get a response just now. Please try again.";

/// Sampling temperature for all completion calls. Low, to encourage
/// numbered steps and consistent phrasing.
const TEMPERATURE: f32 = 0.3;

// ============================================================================
// Wire Types
// ============================================================================

/// Request body for the Responses API.
#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<ResponsesMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

/// One message in Responses API structured-content form.
#[derive(Debug, Serialize)]
struct ResponsesMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

/// A single text content part.
#[derive(Debug, Serialize)]
struct ContentPart<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

/// Requested output format for the Responses API.
#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Request body for the Chat Completions fallback.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

/// Response body for the Chat Completions fallback.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// A single completion choice.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

/// The message inside a completion choice.
#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// ============================================================================
// Client
// ============================================================================

/// Client for the upstream completion API.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl CompletionClient {
    /// Creates a client from the server configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url_trimmed().to_string(),
            model: config.model.clone(),
        }
    }

    /// Requests a completion for the assembled message list.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::UpstreamUnreachable` when the primary request
    /// cannot be sent at all, and `TutorError::Upstream` with the primary
    /// call's status and detail when both the primary call and the single
    /// fallback attempt fail.
    pub async fn complete(&self, api_key: &str, messages: &[Message]) -> Result<String> {
        let body = ResponsesRequest {
            model: &self.model,
            input: messages
                .iter()
                .map(|m| ResponsesMessage {
                    role: role_name(m),
                    content: vec![ContentPart {
                        kind: "text",
                        text: &m.content,
                    }],
                })
                .collect(),
            response_format: ResponseFormat { kind: "text" },
            temperature: TEMPERATURE,
        };

        let response = self
            .http
            .post(format!("{}/v1/responses", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            let data: Value = response.json().await?;
            debug!("Responses API call succeeded");
            return Ok(extract_reply(&data).unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string()));
        }

        let status = response.status().as_u16();
        let detail = error_detail(response).await;
        warn!(status, detail = %detail, "Responses API error, attempting fallback");

        match self.chat_fallback(api_key, messages).await {
            Ok(reply) => Ok(reply),
            Err(fallback_err) => {
                warn!(error = %fallback_err, "Fallback call failed");
                Err(TutorError::upstream(status, detail))
            }
        }
    }

    /// One fallback attempt against the Chat Completions API.
    async fn chat_fallback(&self, api_key: &str, messages: &[Message]) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: TEMPERATURE,
        };

        let response = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = error_detail(response).await;
            return Err(TutorError::upstream(status, detail));
        }

        let data: ChatResponse = response.json().await?;
        let reply = data
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .unwrap_or_else(|| EMPTY_REPLY_FALLBACK.to_string());

        debug!("Chat Completions fallback succeeded");
        Ok(reply)
    }
}

/// Maps a message role to its wire name.
const fn role_name(message: &Message) -> &'static str {
    use tutor_lessons::Role;

    match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

// ============================================================================
// Response Parsing
// ============================================================================

/// Extracts the reply text from a Responses API payload.
///
/// Checks, in order: a non-blank top-level `output_text`; text chunks in
/// the `output` array (content items of type `output_text` or `text`,
/// plus plain string content); and finally the first chat-style choice
/// for compatibility. Returns `None` when no usable text is found.
fn extract_reply(data: &Value) -> Option<String> {
    if let Some(text) = data.get("output_text").and_then(Value::as_str) {
        if !text.trim().is_empty() {
            return Some(text.to_string());
        }
    }

    if let Some(output) = data.get("output").and_then(Value::as_array) {
        let mut chunks = Vec::new();
        for item in output {
            match item.get("content") {
                Some(Value::Array(parts)) => {
                    for part in parts {
                        let is_text = matches!(
                            part.get("type").and_then(Value::as_str),
                            Some("output_text" | "text")
                        );
                        if is_text {
                            if let Some(text) = part.get("text").and_then(Value::as_str) {
                                chunks.push(text.to_string());
                            }
                        }
                    }
                }
                Some(Value::String(text)) => chunks.push(text.clone()),
                _ => {}
            }
        }
        let joined = chunks.join("\n").trim().to_string();
        if !joined.is_empty() {
            return Some(joined);
        }
    }

    data.pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|text| !text.trim().is_empty())
        .map(ToString::to_string)
}

/// Extracts a human-readable error detail from an upstream error body.
async fn error_detail(response: reqwest::Response) -> String {
    let text = response.text().await.unwrap_or_default();
    parse_error_detail(&text)
}

/// Parses an upstream error body into a short detail string.
///
/// Prefers `error.message`, then a top-level `message`, then the compact
/// JSON itself; non-JSON bodies pass through as-is, and blank bodies get
/// a generic message.
fn parse_error_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value.pointer("/error/message").and_then(Value::as_str) {
            return message.to_string();
        }
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
        return value.to_string();
    }

    if body.trim().is_empty() {
        "Upstream error".to_string()
    } else {
        body.to_string()
    }
}
