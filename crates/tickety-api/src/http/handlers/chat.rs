//! SSE streaming chat endpoint.
//!
//! POST /chat
//!
//! Sweeps expired sessions, resolves or creates the session, appends the
//! user message, then streams the generated reply as Server-Sent Events.
//! Each event's data payload is a JSON envelope:
//! - `{"type":"session","session_id":"..."}` -- resolved id, always first
//! - `{"type":"text","value":"..."}` -- incremental reply fragment
//! - `{"type":"error","value":"..."}` -- provider failure, at most one
//!
//! The stream closes with a literal `[DONE]` data line.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::StreamExt;
use serde::Deserialize;
use tokio_stream::Stream;
use uuid::Uuid;

use tickety_types::chat::{ChatEvent, MessageRole, STREAM_DONE};

use crate::state::AppState;

/// Request body for the chat endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user message to relay.
    pub query: String,
    /// Existing session id to continue; a new session is created when
    /// absent, unknown, or expired.
    #[serde(default, alias = "sessionId")]
    pub session_id: Option<String>,
}

/// POST /chat -- SSE streaming chat.
pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    state.sessions.sweep_expired();

    // An unparsable id is treated the same as no id at all.
    let requested: Option<Uuid> = body.session_id.as_deref().and_then(|s| s.parse().ok());
    let session_id = state.sessions.resolve(requested);
    state.sessions.append(&session_id, MessageRole::User, body.query);

    let relay = Arc::clone(&state.relay);
    let sse_stream = async_stream::stream! {
        let session_event = ChatEvent::Session {
            session_id: session_id.to_string(),
        };
        yield Ok::<_, Infallible>(envelope(&session_event));

        let mut reply = std::pin::pin!(relay.stream_reply(session_id));
        while let Some(event) = reply.next().await {
            yield Ok(envelope(&event));
        }

        yield Ok(Event::default().data(STREAM_DONE));
    };

    Sse::new(sse_stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

/// Wrap an envelope as an SSE data event.
fn envelope(event: &ChatEvent) -> Event {
    Event::default().data(serde_json::to_string(event).unwrap_or_default())
}
