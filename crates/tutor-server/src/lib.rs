//! Excel Tutor Server
//!
//! Serves the web client, the lesson catalog, and the chat endpoint that
//! proxies conversations to the upstream completion API.

pub mod api;
pub mod config;
pub mod error;
pub mod upstream;

pub use api::{create_router, AppState, ChatRequest, ChatResponse, ErrorResponse, HealthResponse};
pub use config::{
    Config, API_KEY_VAR, BASE_URL_VAR, MODEL_VAR, PORT_VAR, STATIC_DIR_VAR,
};
pub use error::{Result, TutorError};
pub use upstream::{CompletionClient, EMPTY_REPLY_FALLBACK};
