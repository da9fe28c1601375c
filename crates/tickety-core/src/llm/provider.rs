//! LlmProvider trait definition.
//!
//! The abstraction the completion relay talks to. The trait is object-safe
//! (a boxed stream, no generics) so it can be shared as `Arc<dyn
//! LlmProvider>` and swapped for a scripted provider in tests.
//!
//! Implementations live in tickety-infra (e.g., `OpenAiCompatibleProvider`).

use std::pin::Pin;

use futures_util::Stream;

use tickety_types::llm::{CompletionRequest, LlmError, StreamEvent};

/// Trait for streaming LLM provider backends.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "groq").
    fn name(&self) -> &str;

    /// Send a streaming completion request.
    ///
    /// Returns a finite, forward-only sequence of events terminated by
    /// [`StreamEvent::Done`]. The sequence is not restartable; a fresh
    /// provider call is required to stream again.
    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;
}
