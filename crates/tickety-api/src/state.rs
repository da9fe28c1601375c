//! Application state wiring the store, provider, and relay together.
//!
//! Handlers receive the session store and reply relay through `AppState`;
//! nothing reaches session state through a global.

use std::sync::Arc;

use tickety_core::chat::prompt::BOOKING_SYSTEM_PROMPT;
use tickety_core::chat::relay::{GenerationParams, ReplyRelay};
use tickety_core::chat::store::SessionStore;
use tickety_core::llm::provider::LlmProvider;
use tickety_infra::config::RelayConfig;
use tickety_infra::llm::openai_compat::OpenAiCompatibleProvider;
use tickety_infra::llm::openai_compat::config::groq_defaults;

/// Shared application state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub relay: Arc<ReplyRelay>,
}

impl AppState {
    /// Wire the state from explicit parts.
    ///
    /// Tests use this directly to inject a scripted provider and a
    /// pre-seeded store.
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        sessions: Arc<SessionStore>,
        params: GenerationParams,
    ) -> Self {
        let relay = Arc::new(ReplyRelay::new(provider, Arc::clone(&sessions), params));
        Self { sessions, relay }
    }

    /// Initialize from the process environment.
    ///
    /// Fails when the provider credential is missing, which aborts startup
    /// before the listener binds.
    pub fn init() -> anyhow::Result<Self> {
        let config = RelayConfig::from_env()?;

        let mut provider_config = groq_defaults(&config.api_key, &config.model);
        if let Some(url) = &config.base_url {
            provider_config.base_url = url.clone();
        }
        let provider: Arc<dyn LlmProvider> =
            Arc::new(OpenAiCompatibleProvider::new(provider_config));

        let sessions = Arc::new(SessionStore::new(BOOKING_SYSTEM_PROMPT));
        let params = GenerationParams::for_model(config.model);

        Ok(Self::new(provider, sessions, params))
    }
}
