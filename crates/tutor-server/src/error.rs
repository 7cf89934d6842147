//! Error types for the Excel Tutor server.
//!
//! This module defines the error taxonomy for request handling: missing
//! upstream credentials, upstream API failures, transport failures, and
//! configuration problems. Every error carries an actionable suggestion
//! where one exists, and no error ever crashes the process.

/// A specialized `Result` type for tutor server operations.
pub type Result<T> = std::result::Result<T, TutorError>;

/// Errors that can occur while serving tutor requests.
#[derive(Debug, thiserror::Error)]
pub enum TutorError {
    // ========================================================================
    // Credential Errors
    // ========================================================================
    /// The upstream API credential is not configured.
    ///
    /// Fatal for the request that needed it, never for the process.
    #[error("Server is missing {env_var}.")]
    MissingCredential {
        /// Name of the missing environment variable.
        env_var: String,
    },

    // ========================================================================
    // Upstream Errors
    // ========================================================================
    /// The upstream completion API returned a non-success response and the
    /// fallback attempt did not recover.
    #[error("Upstream completion error ({status}): {detail}")]
    Upstream {
        /// HTTP status code returned by the upstream API.
        status: u16,
        /// Upstream-provided detail, or a generic message when unparseable.
        detail: String,
    },

    /// The upstream completion API could not be reached at all.
    #[error("Could not reach the completion API: {0}")]
    UpstreamUnreachable(#[from] reqwest::Error),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // General Errors
    // ========================================================================
    /// General I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TutorError {
    /// Creates a new `MissingCredential` error for the given variable.
    #[must_use]
    pub fn missing_credential(env_var: impl Into<String>) -> Self {
        Self::MissingCredential {
            env_var: env_var.into(),
        }
    }

    /// Creates a new `Upstream` error with the given status and detail.
    #[must_use]
    pub fn upstream(status: u16, detail: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            detail: detail.into(),
        }
    }

    /// Creates a new `ConfigValidation` error with the given message and
    /// suggestion.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Returns `true` if this error is caused by a missing or rejected
    /// credential rather than connectivity.
    ///
    /// The client UI shows different copy for credential failures.
    #[must_use]
    pub const fn is_credential(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential { .. } | Self::Upstream { status: 401 | 403, .. }
        )
    }

    /// Returns the HTTP status code this error maps to.
    ///
    /// Upstream failures propagate the upstream status code; transport
    /// failures map to 502; everything else is a 500.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Upstream { status, .. } => *status,
            Self::UpstreamUnreachable(_) => 502,
            _ => 500,
        }
    }
}
