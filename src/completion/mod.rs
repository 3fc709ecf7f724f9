//! Completion service boundary

pub mod client;
pub mod models;

pub use client::{Completion, CompletionConfig, OpenAiCompletionClient, PROMPT_SAFETY_MARGIN};
