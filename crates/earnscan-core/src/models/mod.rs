//! Data models: documents, analysis records, reports and configuration.

pub mod analysis;
pub mod config;
pub mod document;
pub mod report;
