//! Completion provider configuration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{CompletionError, CompletionGateway, Result};

/// Completion provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google Gemini generateContent API (default).
    #[default]
    Gemini,
    /// Ollama API (local).
    Ollama,
}

impl Provider {
    /// Parse a provider name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(Self::Gemini),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    /// Default model for this provider.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::Ollama => "llama3.1:8b",
        }
    }

    /// Default API endpoint for this provider.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com",
            Self::Ollama => "http://localhost:11434",
        }
    }
}

/// Configuration for the completion gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Which provider to call.
    pub provider: Provider,

    /// Model identifier sent to the provider.
    pub model: String,

    /// Base URL of the provider API.
    pub endpoint: String,

    /// API key. Only ever read from the environment, never persisted.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Sampling temperature (0.0 - 1.0).
    pub temperature: f32,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        let provider = Provider::default();
        Self {
            provider,
            model: provider.default_model().to_string(),
            endpoint: provider.default_endpoint().to_string(),
            api_key: None,
            timeout_secs: 120,
            temperature: 0.2,
        }
    }
}

impl CompletionConfig {
    /// Apply overrides from the process environment.
    ///
    /// Supported env vars:
    /// - `EARNSCAN_PROVIDER`: "gemini" (default) or "ollama"
    /// - `EARNSCAN_MODEL`: model identifier
    /// - `EARNSCAN_ENDPOINT`: API base URL
    /// - `EARNSCAN_TIMEOUT_SECS`: request timeout
    /// - `EARNSCAN_API_KEY`, then `GEMINI_API_KEY`: API key
    ///
    /// Switching provider without an explicit model or endpoint resets those
    /// to the new provider's defaults.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let explicit_model = lookup("EARNSCAN_MODEL");
        let explicit_endpoint = lookup("EARNSCAN_ENDPOINT");

        if let Some(provider) = lookup("EARNSCAN_PROVIDER").as_deref().and_then(Provider::parse) {
            if provider != self.provider {
                self.provider = provider;
                if explicit_model.is_none() {
                    self.model = provider.default_model().to_string();
                }
                if explicit_endpoint.is_none() {
                    self.endpoint = provider.default_endpoint().to_string();
                }
            }
        }

        if let Some(model) = explicit_model {
            self.model = model;
        }
        if let Some(endpoint) = explicit_endpoint {
            self.endpoint = endpoint;
        }
        if let Some(secs) = lookup("EARNSCAN_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.timeout_secs = secs;
        }

        if let Some(key) = lookup("EARNSCAN_API_KEY").or_else(|| lookup("GEMINI_API_KEY")) {
            if !key.trim().is_empty() {
                self.api_key = Some(key);
            }
        }

        self
    }

    /// Build the gateway for the configured provider.
    pub fn build_gateway(&self) -> Result<Arc<dyn CompletionGateway>> {
        match self.provider {
            #[cfg(feature = "gemini")]
            Provider::Gemini => Ok(Arc::new(crate::GeminiGateway::from_config(self)?)),
            #[cfg(feature = "ollama")]
            Provider::Ollama => Ok(Arc::new(crate::OllamaGateway::from_config(self)?)),
            #[allow(unreachable_patterns)]
            other => Err(CompletionError::Unavailable(format!("{:?}", other))),
        }
    }
}
