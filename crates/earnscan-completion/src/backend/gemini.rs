//! Google Gemini backend using the generateContent API.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{http_client, CompletionGateway};
use crate::config::CompletionConfig;
use crate::{CompletionError, Result};

/// Gateway calling Google's Generative Language API.
pub struct GeminiGateway {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    name: String,
}

#[derive(Debug, Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

impl GeminiGateway {
    /// Create a gateway from configuration. Fails if no API key is set.
    pub fn from_config(config: &CompletionConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(CompletionError::MissingApiKey {
                provider: "gemini",
                env_var: "GEMINI_API_KEY",
            })?;

        Ok(Self {
            client: http_client(config.timeout_secs)?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
            name: format!("gemini:{}", config.model),
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.endpoint, self.model
        )
    }
}

/// Concatenate the text parts of the first candidate.
fn reply_text(response: GeminiResponse) -> Result<String> {
    if let Some(error) = response.error {
        return Err(CompletionError::Provider(error.message));
    }

    let text: String = response
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(CompletionError::EmptyReply);
    }
    Ok(text)
}

#[async_trait]
impl CompletionGateway for GeminiGateway {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: self.temperature,
            },
        };

        debug!("Sending {} char prompt to {}", prompt.len(), self.name);

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
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

        let response: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| CompletionError::Decode(e.to_string()))?;

        let text = reply_text(response)?;
        trace!("Gemini reply: {} chars", text.len());
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
