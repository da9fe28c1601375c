//! Session lifecycle and streaming relay logic for tickety.
//!
//! This crate defines the in-memory session store, the completion relay
//! that turns a transcript into a streamed reply, and the provider trait
//! ("port") that the infrastructure layer implements. It depends only on
//! `tickety-types` -- never on HTTP or provider SDK crates.

pub mod chat;
pub mod llm;
