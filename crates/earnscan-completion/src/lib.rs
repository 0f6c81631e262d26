//! Completion service abstraction for earnscan.
//!
//! This crate provides a single seam, [`CompletionGateway`], for sending a
//! prompt to a generative text service and getting the reply back:
//! - `gemini`: Google's generateContent API
//! - `ollama`: a local Ollama server
//! - [`StaticGateway`]: a fixed reply, for tests and offline runs

mod backend;
mod config;
mod error;

pub use backend::{CompletionGateway, StaticGateway};
pub use config::{CompletionConfig, Provider};
pub use error::CompletionError;

#[cfg(feature = "gemini")]
pub use backend::gemini::GeminiGateway;

#[cfg(feature = "ollama")]
pub use backend::ollama::OllamaGateway;

/// Result type for completion operations.
pub type Result<T> = std::result::Result<T, CompletionError>;
