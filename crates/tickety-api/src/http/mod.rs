//! HTTP layer for the booking relay.
//!
//! Axum-based API: the streaming chat endpoint, a health probe, and
//! permissive CORS for browser frontends.

pub mod handlers;
pub mod router;
