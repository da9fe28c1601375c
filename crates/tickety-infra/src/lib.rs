//! Infrastructure layer for tickety.
//!
//! Contains the implementation of the provider trait defined in
//! `tickety-core` (OpenAI-compatible chat completions over `async-openai`)
//! and process configuration sourced from the environment.

pub mod config;
pub mod llm;
