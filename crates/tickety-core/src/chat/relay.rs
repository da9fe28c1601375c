//! Completion relay: transcript in, incremental reply envelopes out.
//!
//! [`ReplyRelay::stream_reply`] invokes the completion provider with a
//! session's full transcript and forwards text fragments to the caller as
//! they arrive, accumulating the full reply alongside. On a clean end of
//! stream the assembled reply is appended to the transcript as one
//! assistant message; on a provider failure nothing is appended and the
//! failure surfaces as a single error envelope on the stream itself.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use uuid::Uuid;

use tickety_types::chat::ChatEvent;
use tickety_types::llm::{CompletionRequest, MessageRole, StreamEvent};

use crate::chat::store::SessionStore;
use crate::llm::provider::LlmProvider;

/// Pause between successive fragment deliveries to the caller.
const FRAGMENT_PACING: Duration = Duration::from_millis(10);

/// Fixed generation parameters for reply completion calls.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl GenerationParams {
    /// Standard tuning for a given model.
    pub fn for_model(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.7,
            top_p: 1.0,
            max_tokens: 1024,
        }
    }
}

/// Streams generated replies for sessions held in a [`SessionStore`].
pub struct ReplyRelay {
    provider: Arc<dyn LlmProvider>,
    store: Arc<SessionStore>,
    params: GenerationParams,
}

impl ReplyRelay {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<SessionStore>,
        params: GenerationParams,
    ) -> Self {
        Self {
            provider,
            store,
            params,
        }
    }

    /// Stream the next assistant reply for a session.
    ///
    /// The caller must have appended the newest user message to the
    /// transcript before invoking this. Fragments are delivered strictly in
    /// provider-emission order. The assembled reply is appended to the
    /// transcript only after the provider signals a clean end of stream, so
    /// an aborted or failed call never leaves a truncated assistant turn
    /// behind. Dropping the returned stream abandons the provider call and
    /// discards the partial buffer.
    pub fn stream_reply(&self, session_id: Uuid) -> impl Stream<Item = ChatEvent> + Send + 'static {
        let provider = Arc::clone(&self.provider);
        let store = Arc::clone(&self.store);
        let params = self.params.clone();

        async_stream::stream! {
            let Some(messages) = store.transcript(&session_id) else {
                yield ChatEvent::Error {
                    value: "Error generating response: session no longer exists".to_string(),
                };
                return;
            };

            let request = CompletionRequest {
                model: params.model,
                messages,
                max_tokens: params.max_tokens,
                temperature: Some(params.temperature),
                top_p: Some(params.top_p),
                stream: true,
            };

            let mut llm_stream = std::pin::pin!(provider.stream(request));
            let mut reply = String::new();

            while let Some(event) = llm_stream.next().await {
                match event {
                    Ok(StreamEvent::TextDelta { text }) => {
                        if text.is_empty() {
                            continue;
                        }
                        reply.push_str(&text);
                        yield ChatEvent::Text { value: text };
                        tokio::time::sleep(FRAGMENT_PACING).await;
                    }
                    Ok(StreamEvent::Done) => break,
                    Err(e) => {
                        tracing::warn!(%session_id, error = %e, "provider stream failed");
                        yield ChatEvent::Error {
                            value: format!("Error generating response: {e}"),
                        };
                        return;
                    }
                }
            }

            if !store.append(&session_id, MessageRole::Assistant, reply) {
                tracing::warn!(%session_id, "session expired before reply could be recorded");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::pin::Pin;
    use std::sync::Mutex;

    use tickety_types::llm::LlmError;

    const PROMPT: &str = "You are a booking assistant.";

    /// Provider that replays a fixed script and records every request.
    struct ScriptedProvider {
        script: Vec<Result<StreamEvent, LlmError>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn replying(fragments: &[&str]) -> Self {
            let mut script: Vec<Result<StreamEvent, LlmError>> = fragments
                .iter()
                .map(|text| {
                    Ok(StreamEvent::TextDelta {
                        text: text.to_string(),
                    })
                })
                .collect();
            script.push(Ok(StreamEvent::Done));
            Self {
                script,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing_after(fragments: &[&str]) -> Self {
            let mut provider = Self::replying(fragments);
            provider.script.pop();
            provider.script.push(Err(LlmError::Stream("connection reset".to_string())));
            provider
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn stream(
            &self,
            request: CompletionRequest,
        ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
            self.requests.lock().unwrap().push(request);
            let script: Vec<_> = self
                .script
                .iter()
                .map(|item| match item {
                    Ok(event) => Ok(event.clone()),
                    Err(e) => Err(LlmError::Stream(e.to_string())),
                })
                .collect();
            Box::pin(futures_util::stream::iter(script))
        }
    }

    fn relay_with(provider: Arc<ScriptedProvider>) -> (ReplyRelay, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::new(PROMPT));
        let relay = ReplyRelay::new(
            provider,
            Arc::clone(&store),
            GenerationParams::for_model("test-model"),
        );
        (relay, store)
    }

    #[tokio::test]
    async fn test_clean_stream_forwards_fragments_and_appends_reply() {
        let provider = Arc::new(ScriptedProvider::replying(&["Sure, ", "which movie?"]));
        let (relay, store) = relay_with(Arc::clone(&provider));
        let id = store.resolve(None);
        store.append(&id, MessageRole::User, "Book a movie ticket");

        let events: Vec<_> = relay.stream_reply(id).collect().await;

        assert_eq!(
            events,
            vec![
                ChatEvent::Text {
                    value: "Sure, ".to_string()
                },
                ChatEvent::Text {
                    value: "which movie?".to_string()
                },
            ]
        );

        let transcript = store.transcript(&id).unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[2].role, MessageRole::Assistant);
        assert_eq!(transcript[2].content, "Sure, which movie?");
    }

    #[tokio::test]
    async fn test_provider_receives_full_transcript_in_order() {
        let provider = Arc::new(ScriptedProvider::replying(&["ok"]));
        let (relay, store) = relay_with(Arc::clone(&provider));
        let id = store.resolve(None);
        store.append(&id, MessageRole::User, "Book a movie ticket");
        let _: Vec<_> = relay.stream_reply(id).collect().await;

        store.append(&id, MessageRole::User, "2 tickets please");
        let _: Vec<_> = relay.stream_reply(id).collect().await;

        let requests = provider.requests.lock().unwrap();
        let roles: Vec<MessageRole> = requests[1].messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
            ]
        );
        assert_eq!(requests[1].messages[3].content, "2 tickets please");
        assert_eq!(requests[1].model, "test-model");
        assert_eq!(requests[1].max_tokens, 1024);
        assert!(requests[1].stream);
    }

    #[tokio::test]
    async fn test_failure_yields_one_error_and_no_assistant_message() {
        let provider = Arc::new(ScriptedProvider::failing_after(&["Sure, ", "which "]));
        let (relay, store) = relay_with(provider);
        let id = store.resolve(None);
        store.append(&id, MessageRole::User, "Book a movie ticket");

        let events: Vec<_> = relay.stream_reply(id).collect().await;

        assert_eq!(events.len(), 3);
        assert!(matches!(&events[0], ChatEvent::Text { .. }));
        assert!(matches!(&events[1], ChatEvent::Text { .. }));
        match &events[2] {
            ChatEvent::Error { value } => {
                assert!(value.starts_with("Error generating response: "));
            }
            other => panic!("expected error envelope, got {other:?}"),
        }

        // Only the system and user messages remain; no truncated reply.
        let transcript = store.transcript(&id).unwrap();
        assert_eq!(transcript.len(), 2);
        assert!(transcript.iter().all(|m| m.role != MessageRole::Assistant));
    }

    #[tokio::test]
    async fn test_empty_reply_still_appends_assistant_turn() {
        let provider = Arc::new(ScriptedProvider::replying(&[]));
        let (relay, store) = relay_with(provider);
        let id = store.resolve(None);
        store.append(&id, MessageRole::User, "Book a movie ticket");

        let events: Vec<_> = relay.stream_reply(id).collect().await;
        assert!(events.is_empty());

        let transcript = store.transcript(&id).unwrap();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[2].content, "");
    }

    #[tokio::test]
    async fn test_unknown_session_yields_single_error() {
        let provider = Arc::new(ScriptedProvider::replying(&["hi"]));
        let (relay, _store) = relay_with(provider);

        let events: Vec<_> = relay.stream_reply(Uuid::now_v7()).collect().await;

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ChatEvent::Error { .. }));
    }
}
