//! Chat session and event-stream envelope types for the booking relay.
//!
//! A session is an ordered transcript plus a liveness timestamp; the
//! envelope enum is the tagged wrapper around each unit sent to the caller
//! over the event stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Re-export message types from the llm module (used in both chat and llm
// contexts).
pub use crate::llm::{Message, MessageRole};

/// Literal terminal line closing every event stream.
pub const STREAM_DONE: &str = "[DONE]";

/// A conversational session keyed by an opaque id.
///
/// The transcript always begins with exactly one system message, inserted
/// at creation and never removed. It only grows; there is no summarization
/// or windowing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub transcript: Vec<Message>,
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    /// Create a session seeded with the fixed system instruction.
    pub fn new(id: Uuid, system_prompt: &str) -> Self {
        Self {
            id,
            transcript: vec![Message::new(MessageRole::System, system_prompt)],
            last_active_at: Utc::now(),
        }
    }

    /// Append a message and refresh the activity timestamp.
    pub fn push(&mut self, role: MessageRole, content: impl Into<String>) {
        self.transcript.push(Message::new(role, content));
        self.last_active_at = Utc::now();
    }
}

/// Envelope for each unit delivered to the caller over the event stream.
///
/// Serializes to the wire objects directly:
/// `{"type":"session","session_id":"..."}`, `{"type":"text","value":"..."}`,
/// `{"type":"error","value":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ChatEvent {
    /// The resolved session id, sent exactly once as the first envelope.
    Session { session_id: String },

    /// An incremental fragment of the generated reply.
    Text { value: String },

    /// A human-readable provider failure; at most one per stream.
    Error { value: String },
}
