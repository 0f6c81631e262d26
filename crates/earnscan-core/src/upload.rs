//! Checks applied to an uploaded file before it is analysed.

use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::models::config::UploadConfig;
use crate::models::document::{file_extension, SourceFormat};

/// Extension and size limits for uploads.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_file_size_bytes: usize,
    allowed_extensions: Vec<String>,
}

impl UploadPolicy {
    /// Create a policy from upload configuration.
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            max_file_size_bytes: config.max_file_size_bytes,
            allowed_extensions: config
                .allowed_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    /// Maximum accepted size in bytes.
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_bytes
    }

    /// Check a file name and size, returning its declared format.
    ///
    /// The extension is checked before the size.
    pub fn check(&self, file_name: &str, size: usize) -> Result<SourceFormat> {
        let extension = file_extension(file_name);

        let format = SourceFormat::from_tag(&extension)
            .filter(|_| self.allowed_extensions.iter().any(|e| *e == extension))
            .ok_or_else(|| {
                AnalysisError::UnsupportedFormat(if extension.is_empty() {
                    file_name.to_string()
                } else {
                    format!(".{}", extension)
                })
            })?;

        if size > self.max_file_size_bytes {
            return Err(AnalysisError::PayloadTooLarge {
                size,
                limit: self.max_file_size_bytes,
            });
        }

        debug!("Accepted {} ({} bytes) as {}", file_name, size, format);
        Ok(format)
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(&UploadConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const LIMIT: usize = 5 * 1024 * 1024;

    #[test]
    fn test_accepts_supported_extensions() {
        let policy = UploadPolicy::default();
        assert_eq!(policy.check("q3.pdf", 10).unwrap(), SourceFormat::Pdf);
        assert_eq!(policy.check("Q3.DOCX", 10).unwrap(), SourceFormat::Docx);
        assert_eq!(policy.check("notes.txt", 0).unwrap(), SourceFormat::PlainText);
    }

    #[test]
    fn test_rejects_other_extensions() {
        let policy = UploadPolicy::default();
        for name in ["deck.pptx", "sheet.xlsx", "README", "archive.pdf.zip"] {
            let err = policy.check(name, 10).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedFormat, "{}", name);
        }
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let policy = UploadPolicy::default();
        assert!(policy.check("call.txt", LIMIT).is_ok());

        let err = policy.check("call.txt", LIMIT + 1).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::PayloadTooLarge { size, limit } if size == LIMIT + 1 && limit == LIMIT
        ));
    }

    #[test]
    fn test_extension_checked_before_size() {
        let err = UploadPolicy::default().check("huge.exe", LIMIT * 10).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_allowed_list_narrows_formats() {
        let config = UploadConfig {
            allowed_extensions: vec![".TXT".to_string()],
            ..UploadConfig::default()
        };
        let policy = UploadPolicy::new(&config);
        assert!(policy.check("a.txt", 1).is_ok());
        assert_eq!(
            policy.check("a.pdf", 1).unwrap_err().kind(),
            ErrorKind::UnsupportedFormat
        );
    }
}
