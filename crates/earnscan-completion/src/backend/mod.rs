//! Completion gateway implementations.

#[cfg(feature = "gemini")]
pub mod gemini;

#[cfg(feature = "ollama")]
pub mod ollama;

mod fixed;

pub use fixed::StaticGateway;

use async_trait::async_trait;

use crate::Result;

/// Trait for generative text-completion services.
///
/// A gateway performs exactly one round trip per call: the prompt goes out,
/// the full reply text comes back. Implementations do not retry and do not
/// stream. Any transport or provider failure is reported as a
/// [`CompletionError`](crate::CompletionError).
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    /// Send a prompt and return the raw reply text.
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Short identifier used in logs (e.g. "gemini:gemini-2.5-flash").
    fn name(&self) -> &str;
}

#[cfg(any(feature = "gemini", feature = "ollama"))]
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| crate::CompletionError::Client(e.to_string()))
}
