//! Shared domain types for the tickety booking relay.
//!
//! This crate contains the types used across the relay: conversation
//! messages, completion request/stream shapes, the session record, and the
//! event-stream envelope.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod llm;
