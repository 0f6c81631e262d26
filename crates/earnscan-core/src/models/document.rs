//! Source formats and extracted document text.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Supported source document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Portable Document Format.
    Pdf,
    /// Office Open XML word-processing document.
    Docx,
    /// UTF-8 plain text.
    #[serde(rename = "txt")]
    PlainText,
}

impl SourceFormat {
    /// All supported formats.
    pub const ALL: [SourceFormat; 3] = [Self::Pdf, Self::Docx, Self::PlainText];

    /// Parse a declared format tag such as `"pdf"`, `".DOCX"` or `"txt"`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Canonical file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::PlainText => "txt",
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => f.write_str("PDF"),
            Self::Docx => f.write_str("DOCX"),
            Self::PlainText => f.write_str("plain text"),
        }
    }
}

/// Lower-cased extension of a file name, without the dot.
///
/// Returns an empty string when the name has no extension.
pub fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Text extracted from one uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    /// Extracted text.
    pub text: String,
    /// Format the text was extracted from.
    pub source_format: SourceFormat,
}

impl ExtractedDocument {
    /// Whether the text is empty after trimming whitespace.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// First `max_chars` characters of the text.
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.text.char_indices().nth(max_chars) {
            Some((idx, _)) => &self.text[..idx],
            None => &self.text,
        }
    }
}
