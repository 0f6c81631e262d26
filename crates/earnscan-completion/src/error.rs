//! Error types for the completion layer.

use thiserror::Error;

/// Errors that can occur while talking to a completion service.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// No API key was configured for a provider that requires one.
    #[error("missing API key for {provider} (set {env_var})")]
    MissingApiKey {
        provider: &'static str,
        env_var: &'static str,
    },

    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(String),

    /// The request never produced an HTTP response.
    #[error("connection error: {0}")]
    Connection(String),

    /// The provider answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The provider returned an error object in an otherwise valid response.
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider response envelope could not be decoded.
    #[error("failed to decode provider response: {0}")]
    Decode(String),

    /// The provider returned no text at all.
    #[error("provider returned no text")]
    EmptyReply,

    /// The requested provider is not compiled into this build.
    #[error("provider not available in this build: {0}")]
    Unavailable(String),
}
