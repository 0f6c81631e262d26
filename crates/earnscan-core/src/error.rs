//! Error types for the earnscan-core library.

use serde::Serialize;
use thiserror::Error;

use crate::models::document::SourceFormat;

/// Classified failure of an analysis request.
///
/// Every variant is terminal: the pipeline never retries and never turns an
/// error into a placeholder record.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Declared format is outside the supported set.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The upload could not be read from storage.
    #[error("could not read document: {0}")]
    Unreadable(String),

    /// Upload exceeds the configured size limit.
    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    /// Extraction ran but found no usable text.
    #[error("could not extract text from document")]
    ExtractionEmpty,

    /// The bytes could not be decoded as the declared format.
    #[error("failed to decode {format} document: {reason}")]
    DecodingFailure {
        format: SourceFormat,
        reason: String,
    },

    /// The completion service call failed.
    #[error("completion service failed: {0}")]
    UpstreamFailure(String),

    /// The cleaned reply is not parseable JSON.
    #[error("model returned invalid JSON: {reason}")]
    MalformedCompletionReply { raw: String, reason: String },

    /// The reply parsed but does not match the output schema.
    #[error("schema violation at `{field}`: {reason}")]
    SchemaViolation { field: String, reason: String },
}

/// Machine-readable error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnsupportedFormat,
    Unreadable,
    PayloadTooLarge,
    ExtractionEmpty,
    DecodingFailure,
    UpstreamFailure,
    MalformedCompletionReply,
    SchemaViolation,
}

impl ErrorKind {
    /// Stable snake_case name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnsupportedFormat => "unsupported_format",
            Self::Unreadable => "unreadable",
            Self::PayloadTooLarge => "payload_too_large",
            Self::ExtractionEmpty => "extraction_empty",
            Self::DecodingFailure => "decoding_failure",
            Self::UpstreamFailure => "upstream_failure",
            Self::MalformedCompletionReply => "malformed_completion_reply",
            Self::SchemaViolation => "schema_violation",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AnalysisError {
    /// Kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::Unreadable(_) => ErrorKind::Unreadable,
            Self::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            Self::ExtractionEmpty => ErrorKind::ExtractionEmpty,
            Self::DecodingFailure { .. } => ErrorKind::DecodingFailure,
            Self::UpstreamFailure(_) => ErrorKind::UpstreamFailure,
            Self::MalformedCompletionReply { .. } => ErrorKind::MalformedCompletionReply,
            Self::SchemaViolation { .. } => ErrorKind::SchemaViolation,
        }
    }

    /// Offending reply text, for malformed replies only.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            Self::MalformedCompletionReply { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub(crate) fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaViolation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<earnscan_completion::CompletionError> for AnalysisError {
    fn from(err: earnscan_completion::CompletionError) -> Self {
        Self::UpstreamFailure(err.to_string())
    }
}

impl From<ExtractionError> for AnalysisError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::Unsupported(tag) => Self::UnsupportedFormat(tag),
            ExtractionError::Pdf(reason) => Self::DecodingFailure {
                format: SourceFormat::Pdf,
                reason,
            },
            ExtractionError::Docx(reason) => Self::DecodingFailure {
                format: SourceFormat::Docx,
                reason,
            },
            ExtractionError::Utf8(e) => Self::DecodingFailure {
                format: SourceFormat::PlainText,
                reason: e.to_string(),
            },
        }
    }
}

/// Format-level failures while turning bytes into text.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No extractor handles this format tag.
    #[error("unsupported format: {0}")]
    Unsupported(String),

    /// PDF could not be parsed, decrypted, or has no pages.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// DOCX container or document part could not be read.
    #[error("DOCX error: {0}")]
    Docx(String),

    /// Plain text is not valid UTF-8.
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Result type for the earnscan-core library.
pub type Result<T> = std::result::Result<T, AnalysisError>;
