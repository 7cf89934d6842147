//! Server configuration.
//!
//! Configuration is environment-driven: the upstream credential, model
//! name, upstream base URL, listen port, and static asset directory. The
//! credential is deliberately optional at startup so a misconfigured
//! server still boots and reports the problem per request instead of
//! crashing.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TutorError};

/// Environment variable holding the upstream API credential.
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Environment variable overriding the model name.
pub const MODEL_VAR: &str = "OPENAI_MODEL";

/// Environment variable overriding the upstream base URL.
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";

/// Environment variable overriding the listen port.
pub const PORT_VAR: &str = "PORT";

/// Environment variable overriding the static asset directory.
pub const STATIC_DIR_VAR: &str = "TUTOR_STATIC_DIR";

/// Default model name. Change via `OPENAI_MODEL`.
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

/// Default upstream base URL.
fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

/// Default listen port.
const fn default_port() -> u16 {
    3000
}

/// Default static asset directory.
fn default_static_dir() -> String {
    "public".to_string()
}

/// Main configuration for the tutor server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Upstream API credential. Absent means every chat request fails
    /// with a descriptive error; the server itself stays up.
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Model name sent to the completion API.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL of the completion API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// TCP port the server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory of static web client assets.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Config {
    /// Builds configuration from process environment variables.
    ///
    /// Missing variables fall back to defaults; a missing credential is
    /// not an error here. An unparseable `PORT` is rejected with a
    /// suggestion rather than silently ignored.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::ConfigValidation` if `PORT` is set but not a
    /// valid TCP port, or if any populated value fails [`Config::validate`].
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(key) = std::env::var(API_KEY_VAR) {
            if !key.trim().is_empty() {
                config.api_key = Some(key);
            }
        }
        if let Ok(model) = std::env::var(MODEL_VAR) {
            config.model = model;
        }
        if let Ok(base_url) = std::env::var(BASE_URL_VAR) {
            config.base_url = base_url;
        }
        if let Ok(port) = std::env::var(PORT_VAR) {
            config.port = port.trim().parse().map_err(|_| {
                TutorError::config_validation(
                    format!("{PORT_VAR} must be a number between 1 and 65535, got '{port}'"),
                    format!("Set {PORT_VAR} to a valid TCP port or unset it to use 3000"),
                )
            })?;
        }
        if let Ok(static_dir) = std::env::var(STATIC_DIR_VAR) {
            config.static_dir = static_dir;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `TutorError::ConfigValidation` if the model name is empty,
    /// the base URL is empty or not HTTP(S), the port is zero, or the
    /// static directory is empty.
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(TutorError::config_validation(
                "model name must not be empty",
                format!("Set {MODEL_VAR} to a model name such as gpt-4o-mini, or unset it"),
            ));
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(TutorError::config_validation(
                format!("base URL must start with http:// or https://, got '{}'", self.base_url),
                format!("Set {BASE_URL_VAR} to a full URL, or unset it to use the default"),
            ));
        }

        if self.port == 0 {
            return Err(TutorError::config_validation(
                "port must be greater than 0",
                format!("Set {PORT_VAR} to a valid TCP port or unset it to use 3000"),
            ));
        }

        if self.static_dir.trim().is_empty() {
            return Err(TutorError::config_validation(
                "static asset directory must not be empty",
                format!("Set {STATIC_DIR_VAR} to a directory path, or unset it to use 'public'"),
            ));
        }

        Ok(())
    }

    /// Returns the upstream base URL with any trailing slash removed.
    #[must_use]
    pub fn base_url_trimmed(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
