//! HTTP API endpoints for the Excel Tutor server.
//!
//! This module provides the small REST surface the web client talks to,
//! plus static file serving for the client itself.
//!
//! # Endpoints
//!
//! - `POST /chat` - Build the prompt sequence and proxy it upstream
//! - `GET /lessons.json` - Lesson catalog listing (seeds stripped)
//! - `GET /health` - Liveness probe
//! - Anything else - Served from the static asset directory
//!
//! # Example
//!
//! ```no_run
//! use tutor_server::{AppState, Config, create_router};
//!
//! # async fn example() {
//! let state = AppState::new(Config::default());
//!
//! let router = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//! axum::serve(listener, router).await.unwrap();
//! # }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info, warn};

use tutor_lessons::{build_messages, Catalog, ClientMessage, LessonSummary, Mode};

use crate::config::{Config, API_KEY_VAR};
use crate::error::TutorError;
use crate::upstream::CompletionClient;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the chat endpoint.
///
/// Every field is optional or defaulted; malformed pieces inside
/// `messages` are filtered during sanitization, not rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// The conversation history as the client holds it.
    #[serde(default)]
    pub messages: Vec<ClientMessage>,
    /// Lesson whose seed should open the conversation, if any.
    #[serde(default)]
    pub lesson_id: Option<String>,
    /// Orchestration mode ("normal", "remediate", "advance").
    #[serde(default)]
    pub mode: Option<String>,
}

/// Response body for the chat endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The tutor's reply text.
    pub reply: String,
}

/// Response body for the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `true` when the server is up.
    pub ok: bool,
}

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error.
    pub error: String,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Config,
    /// The built-in lesson catalog.
    pub catalog: &'static Catalog,
    /// Client for the upstream completion API.
    pub client: CompletionClient,
}

impl AppState {
    /// Creates a new `AppState` from the given configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let client = CompletionClient::new(&config);
        Self {
            config,
            catalog: Catalog::builtin(),
            client,
        }
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Wrapper turning a [`TutorError`] into an HTTP response.
///
/// The body is always `{"error": "..."}` and the status comes from
/// [`TutorError::status_code`], so upstream failures keep their original
/// status on the way out.
#[derive(Debug)]
struct ApiError(TutorError);

impl From<TutorError> for ApiError {
    fn from(err: TutorError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all endpoints.
///
/// # Arguments
///
/// * `state` - The shared application state
///
/// # Returns
///
/// An axum `Router` configured with:
/// - The chat, lessons, and health routes
/// - Static file serving from the configured asset directory
/// - CORS middleware for development
/// - Tracing middleware for request logging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS for development (allow all origins)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/chat", post(handle_chat))
        .route("/lessons.json", get(handle_lessons))
        .route("/health", get(handle_health))
        .fallback_service(static_files)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Handlers
// ============================================================================

/// Handler for `POST /chat`.
///
/// Assembles the prompt sequence from the request and proxies it to the
/// upstream completion API. The credential is checked per request so a
/// server booted without one still serves lessons and static assets.
async fn handle_chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let mode = Mode::parse(request.mode.as_deref());

    info!(
        history_len = request.messages.len(),
        lesson_id = request.lesson_id.as_deref().unwrap_or("-"),
        %mode,
        "Chat request received"
    );

    let messages = build_messages(
        &request.messages,
        request.lesson_id.as_deref(),
        mode,
        state.catalog,
    );

    let Some(api_key) = state.config.api_key.as_deref() else {
        warn!("Chat request rejected: {API_KEY_VAR} is not configured");
        return Err(TutorError::missing_credential(API_KEY_VAR).into());
    };

    let reply = state.client.complete(api_key, &messages).await?;

    info!(reply_len = reply.len(), "Chat request completed");
    Ok(Json(ChatResponse { reply }))
}

/// Handler for `GET /lessons.json`.
///
/// Returns the catalog listing keyed by lesson id. Seed prompts never
/// leave the server.
async fn handle_lessons(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<&'static str, LessonSummary>> {
    Json(state.catalog.listing())
}

/// Handler for `GET /health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

// ============================================================================
// Tests
// ============================================================================
