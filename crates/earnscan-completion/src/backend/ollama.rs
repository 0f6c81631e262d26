//! Ollama backend for locally hosted models.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{http_client, CompletionGateway};
use crate::config::CompletionConfig;
use crate::{CompletionError, Result};

/// Gateway calling an Ollama server's generate endpoint.
pub struct OllamaGateway {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    name: String,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
    error: Option<String>,
}

impl OllamaGateway {
    /// Create a gateway from configuration.
    pub fn from_config(config: &CompletionConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            name: format!("ollama:{}", config.model),
        })
    }
}

fn reply_text(response: OllamaResponse) -> Result<String> {
    if let Some(error) = response.error {
        return Err(CompletionError::Provider(error));
    }
    if response.response.is_empty() {
        return Err(CompletionError::EmptyReply);
    }
    Ok(response.response)
}

#[async_trait]
impl CompletionGateway for OllamaGateway {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = OllamaRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        debug!("Sending {} char prompt to {}", prompt.len(), self.name);

        let url = format!("{}/api/generate", self.endpoint);
        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Connection(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let response: OllamaResponse = resp
            .json()
            .await
            .map_err(|e| CompletionError::Decode(e.to_string()))?;

        reply_text(response)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_text() {
        let response: OllamaResponse =
            serde_json::from_str(r#"{"response":"{}","done":true}"#).unwrap();
        assert_eq!(reply_text(response).unwrap(), "{}");
    }

    #[test]
    fn test_reply_text_error() {
        let response: OllamaResponse =
            serde_json::from_str(r#"{"error":"model 'x' not found"}"#).unwrap();
        assert!(matches!(
            reply_text(response),
            Err(CompletionError::Provider(_))
        ));
    }

    #[test]
    fn test_request_disables_streaming() {
        let request = OllamaRequest {
            model: "m",
            prompt: "p",
            stream: false,
            options: OllamaOptions { temperature: 0.0 },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["stream"], serde_json::json!(false));
    }
}
