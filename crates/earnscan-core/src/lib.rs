//! Core library for earnings document analysis.
//!
//! This crate provides:
//! - Text extraction from PDF, DOCX and plain text documents
//! - Prompt construction with a bounded document excerpt
//! - Reply normalization and schema validation
//! - The analysis pipeline and its classified error taxonomy
//! - Upload limits, output envelopes and configuration

pub mod error;
pub mod extract;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod upload;
pub mod validate;

pub use error::{AnalysisError, ErrorKind, ExtractionError, Result};
pub use extract::{DocxExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
pub use models::analysis::{
    AnalysisRecord, ConfidenceLevel, DocumentType, ForwardGuidance, ManagementTone,
};
pub use models::config::EarnscanConfig;
pub use models::document::{ExtractedDocument, SourceFormat};
pub use models::report::{AnalysisReport, ErrorReport, Outcome};
pub use normalize::ResponseNormalizer;
pub use pipeline::{AnalysisPipeline, Stage};
pub use prompt::{AnalysisPrompt, PromptBuilder};
pub use upload::UploadPolicy;
pub use validate::SchemaValidator;

/// Re-export completion types.
pub use earnscan_completion::{
    CompletionConfig, CompletionError, CompletionGateway, Provider, StaticGateway,
};
