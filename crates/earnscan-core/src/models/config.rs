//! Configuration structures for the analysis pipeline.

use serde::{Deserialize, Serialize};

use earnscan_completion::CompletionConfig;

use crate::prompt::DEFAULT_MAX_EXCERPT_CHARS;

/// Main configuration for earnscan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EarnscanConfig {
    /// Upload boundary limits.
    pub upload: UploadConfig,

    /// Prompt construction.
    pub prompt: PromptConfig,

    /// Completion service selection.
    pub completion: CompletionConfig,
}

/// Limits applied before a document reaches the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum upload size in bytes.
    pub max_file_size_bytes: usize,

    /// Accepted file extensions, without the dot.
    pub allowed_extensions: Vec<String>,

    /// Characters shown by the extract preview.
    pub preview_chars: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 5 * 1024 * 1024,
            allowed_extensions: vec!["pdf".to_string(), "docx".to_string(), "txt".to_string()],
            preview_chars: 1000,
        }
    }
}

/// Prompt construction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Maximum number of document characters included in the prompt.
    pub max_excerpt_chars: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_excerpt_chars: DEFAULT_MAX_EXCERPT_CHARS,
        }
    }
}

impl EarnscanConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Apply environment overrides to the completion section.
    pub fn with_env_overrides(mut self) -> Self {
        self.completion = self.completion.with_env_overrides();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EarnscanConfig::default();
        assert_eq!(config.upload.max_file_size_bytes, 5_242_880);
        assert_eq!(config.upload.allowed_extensions, ["pdf", "docx", "txt"]);
        assert_eq!(config.prompt.max_excerpt_chars, 12_000);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: EarnscanConfig =
            serde_json::from_str(r#"{"prompt": {"max_excerpt_chars": 500}}"#).unwrap();
        assert_eq!(config.prompt.max_excerpt_chars, 500);
        assert_eq!(config.upload.preview_chars, 1000);
        assert_eq!(config.completion.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = EarnscanConfig::default();
        config.upload.preview_chars = 42;
        config.save(&path).unwrap();

        let loaded = EarnscanConfig::from_file(&path).unwrap();
        assert_eq!(loaded.upload.preview_chars, 42);
    }
}
