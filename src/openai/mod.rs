//! Chat-completion client used to generate research questions.

pub mod client;
pub mod types;

pub use client::{CompletionClient, CompletionError, OpenAiClient};
