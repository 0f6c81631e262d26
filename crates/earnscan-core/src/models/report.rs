//! Output envelope pairing a file name with its analysis or its error.

use serde::Serialize;

use super::analysis::AnalysisRecord;
use crate::error::{AnalysisError, ErrorKind};

/// Serializable error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    /// Machine-readable error kind.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub detail: String,
    /// Offending completion reply, for malformed replies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
}

impl From<&AnalysisError> for ErrorReport {
    fn from(err: &AnalysisError) -> Self {
        Self {
            kind: err.kind(),
            detail: err.to_string(),
            raw_output: err.raw_output().map(str::to_string),
        }
    }
}

/// Either side of an analysis, as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Outcome {
    #[serde(rename = "analysis")]
    Analysis(AnalysisRecord),
    #[serde(rename = "error")]
    Error(ErrorReport),
}

/// Result of analysing one named document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisReport {
    pub filename: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl AnalysisReport {
    /// Build a report from a pipeline result.
    pub fn new(
        filename: impl Into<String>,
        result: &std::result::Result<AnalysisRecord, AnalysisError>,
    ) -> Self {
        let outcome = match result {
            Ok(record) => Outcome::Analysis(record.clone()),
            Err(err) => Outcome::Error(ErrorReport::from(err)),
        };
        Self {
            filename: filename.into(),
            outcome,
        }
    }

    /// The record, if the analysis succeeded.
    pub fn record(&self) -> Option<&AnalysisRecord> {
        match &self.outcome {
            Outcome::Analysis(record) => Some(record),
            Outcome::Error(_) => None,
        }
    }

    /// The error, if the analysis failed.
    pub fn error(&self) -> Option<&ErrorReport> {
        match &self.outcome {
            Outcome::Analysis(_) => None,
            Outcome::Error(err) => Some(err),
        }
    }
}
