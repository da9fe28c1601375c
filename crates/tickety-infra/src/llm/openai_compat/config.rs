//! Configuration and per-provider defaults for OpenAI-compatible providers.
//!
//! Any endpoint that speaks the OpenAI chat completions protocol gets a
//! factory function returning an [`OpenAiCompatConfig`] with the correct
//! base URL.

/// Configuration for an OpenAI-compatible LLM provider.
///
/// Used to construct an [`super::OpenAiCompatibleProvider`].
pub struct OpenAiCompatConfig {
    /// Human-readable provider name (e.g., "groq").
    pub provider_name: String,
    /// Base URL for the API (e.g., "https://api.groq.com/openai/v1").
    pub base_url: String,
    /// API key for authentication.
    pub api_key: String,
    /// Model identifier (e.g., "llama-3.3-70b-versatile").
    pub model: String,
}

/// Groq default configuration.
///
/// Base URL: `https://api.groq.com/openai/v1`
pub fn groq_defaults(api_key: &str, model: &str) -> OpenAiCompatConfig {
    OpenAiCompatConfig {
        provider_name: "groq".into(),
        base_url: "https://api.groq.com/openai/v1".into(),
        api_key: api_key.into(),
        model: model.into(),
    }
}
