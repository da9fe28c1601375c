//! Process configuration sourced from environment variables.
//!
//! The provider credential is the one required setting: the process must
//! refuse to start without it rather than run degraded. Model and base URL
//! are optional overrides for the Groq defaults.

use thiserror::Error;

/// Model used when `GROQ_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Configuration errors surfaced at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GROQ_API_KEY environment variable is not set")]
    MissingApiKey,
}

/// Relay configuration resolved from the environment.
///
/// Intentionally does NOT derive Debug so the API key never lands in logs
/// or panic messages.
#[derive(Clone)]
pub struct RelayConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: Option<String>,
}

impl RelayConfig {
    /// Read configuration from the process environment.
    ///
    /// `GROQ_API_KEY` is required; unset or empty values fail. `GROQ_MODEL`
    /// and `GROQ_BASE_URL` are optional overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env_nonempty("GROQ_API_KEY").ok_or(ConfigError::MissingApiKey)?;
        let model = env_nonempty("GROQ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = env_nonempty("GROQ_BASE_URL");

        Ok(Self {
            api_key,
            model,
            base_url,
        })
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
