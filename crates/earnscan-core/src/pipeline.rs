//! End-to-end analysis of one document.
//!
//! A request moves through
//! `Received → Extracted → PromptBuilt → CompletionObtained → Normalized →
//! Validated → Done`. The first failing stage ends the request with its
//! classified error. Nothing is retried and no partial record is returned.
//!
//! The pipeline holds no per-request state, so one instance can serve any
//! number of concurrent requests. The completion round trip is the only
//! suspension point.

use std::sync::Arc;
use std::time::Instant;

use earnscan_completion::CompletionGateway;
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::extract;
use crate::models::analysis::AnalysisRecord;
use crate::models::config::EarnscanConfig;
use crate::models::document::{ExtractedDocument, SourceFormat};
use crate::normalize::ResponseNormalizer;
use crate::prompt::{AnalysisPrompt, PromptBuilder};
use crate::upload::UploadPolicy;
use crate::validate::SchemaValidator;

/// Pipeline stage a request has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Extracted,
    PromptBuilt,
    CompletionObtained,
    Normalized,
    Validated,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Extracted => "extracted",
            Self::PromptBuilt => "prompt_built",
            Self::CompletionObtained => "completion_obtained",
            Self::Normalized => "normalized",
            Self::Validated => "validated",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Orchestrates extraction, prompting, completion and validation.
#[derive(Clone)]
pub struct AnalysisPipeline {
    gateway: Arc<dyn CompletionGateway>,
    prompt_builder: PromptBuilder,
    normalizer: ResponseNormalizer,
    validator: SchemaValidator,
    upload_policy: UploadPolicy,
}

impl AnalysisPipeline {
    /// Create a pipeline with default limits around `gateway`.
    pub fn new(gateway: Arc<dyn CompletionGateway>) -> Self {
        Self {
            gateway,
            prompt_builder: PromptBuilder::new(),
            normalizer: ResponseNormalizer,
            validator: SchemaValidator,
            upload_policy: UploadPolicy::default(),
        }
    }

    /// Create a pipeline using the limits in `config`.
    pub fn from_config(config: &EarnscanConfig, gateway: Arc<dyn CompletionGateway>) -> Self {
        Self::new(gateway)
            .with_prompt_builder(
                PromptBuilder::new().with_max_excerpt_chars(config.prompt.max_excerpt_chars),
            )
            .with_upload_policy(UploadPolicy::new(&config.upload))
    }

    /// Set the prompt builder.
    pub fn with_prompt_builder(mut self, prompt_builder: PromptBuilder) -> Self {
        self.prompt_builder = prompt_builder;
        self
    }

    /// Set the upload policy.
    pub fn with_upload_policy(mut self, upload_policy: UploadPolicy) -> Self {
        self.upload_policy = upload_policy;
        self
    }

    /// Name of the completion gateway in use.
    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }

    /// Analyse `bytes` declared with a free-form format tag.
    ///
    /// Tags other than `pdf`, `docx` and `txt` fail with
    /// [`AnalysisError::UnsupportedFormat`] before any bytes are read.
    pub async fn analyze(&self, bytes: &[u8], declared_format: &str) -> Result<AnalysisRecord> {
        let format = SourceFormat::from_tag(declared_format)
            .ok_or_else(|| AnalysisError::UnsupportedFormat(declared_format.to_string()))?;
        self.analyze_document(bytes, format).await
    }

    /// Analyse `bytes` of a known format.
    pub async fn analyze_document(
        &self,
        bytes: &[u8],
        format: SourceFormat,
    ) -> Result<AnalysisRecord> {
        let start = Instant::now();
        debug!("Stage {}: {} byte {} document", Stage::Received, bytes.len(), format);

        let document = self.extract_stage(bytes, format)?;
        let prompt = self.prompt_stage(&document);

        let raw = self.gateway.complete(prompt.as_str()).await?;
        debug!(
            "Stage {}: {} chars from {}",
            Stage::CompletionObtained,
            raw.len(),
            self.gateway.name()
        );

        let cleaned = self.normalizer.normalize(&raw);
        debug!("Stage {}: {} chars", Stage::Normalized, cleaned.len());

        let record = self.validator.validate(&cleaned)?;
        debug!("Stage {}", Stage::Validated);

        info!(
            "Analysed {} document in {}ms: {}",
            format,
            start.elapsed().as_millis(),
            record.document_type
        );
        debug!("Stage {}", Stage::Done);
        Ok(record)
    }

    /// Apply the upload policy, then analyse.
    pub async fn analyze_upload(&self, file_name: &str, bytes: &[u8]) -> Result<AnalysisRecord> {
        let format = self.upload_policy.check(file_name, bytes.len())?;
        self.analyze_document(bytes, format).await
    }

    /// Apply the upload policy and extract text without analysing it.
    pub fn extract_upload(&self, file_name: &str, bytes: &[u8]) -> Result<ExtractedDocument> {
        let format = self.upload_policy.check(file_name, bytes.len())?;
        self.extract_stage(bytes, format)
    }

    /// Build the prompt an upload would be analysed with.
    pub fn build_prompt(&self, file_name: &str, bytes: &[u8]) -> Result<AnalysisPrompt> {
        let document = self.extract_upload(file_name, bytes)?;
        Ok(self.prompt_stage(&document))
    }

    fn extract_stage(&self, bytes: &[u8], format: SourceFormat) -> Result<ExtractedDocument> {
        let document = extract::extract(bytes, format)?;
        if document.is_blank() {
            return Err(AnalysisError::ExtractionEmpty);
        }
        debug!(
            "Stage {}: {} chars",
            Stage::Extracted,
            document.text.chars().count()
        );
        Ok(document)
    }

    fn prompt_stage(&self, document: &ExtractedDocument) -> AnalysisPrompt {
        let prompt = self.prompt_builder.build(&document.text);
        debug!(
            "Stage {}: {} excerpt chars, truncated: {}",
            Stage::PromptBuilt,
            prompt.excerpt_chars(),
            prompt.was_truncated()
        );
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::extract::fixtures::{docx_with_paragraphs, pdf_with_pages};
    use crate::models::analysis::{DocumentType, ManagementTone};
    use async_trait::async_trait;
    use earnscan_completion::{CompletionError, StaticGateway};
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    const EARNINGS_REPLY: &str = r#"```json
{
  "document_type": "Earnings Transcript",
  "management_tone": "Optimistic",
  "confidence_level": "High",
  "confidence_reasoning": "Growth and margins were quantified.",
  "key_positives": ["Revenue grew 12%", "Strong margins"],
  "key_concerns": [],
  "forward_guidance": {"revenue": "Not Mentioned", "margin": "Not Mentioned", "capex": "Not Mentioned"},
  "capacity_utilization": "Not Mentioned",
  "growth_initiatives": []
}
```"#;

    /// Records every prompt it receives.
    struct RecordingGateway {
        reply: std::result::Result<String, String>,
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingGateway {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing(reason: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(reason.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionGateway for RecordingGateway {
        async fn complete(&self, prompt: &str) -> earnscan_completion::Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(reason) => Err(CompletionError::Connection(reason.clone())),
            }
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    #[tokio::test]
    async fn test_earnings_text_end_to_end() {
        let gateway = RecordingGateway::replying(EARNINGS_REPLY);
        let pipeline = AnalysisPipeline::new(gateway.clone());
        let text = "Revenue grew 12% with strong margins; no capex guidance given.";

        let record = pipeline.analyze(text.as_bytes(), "txt").await.unwrap();
        assert_eq!(record.document_type, DocumentType::EarningsTranscript);
        assert_eq!(record.management_tone, ManagementTone::Optimistic);
        assert_eq!(record.forward_guidance.capex, "Not Mentioned");

        let prompts = gateway.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with(&format!("{}\n", text)));
    }

    #[tokio::test]
    async fn test_unsupported_document_passes_through() {
        let reply = serde_json::to_string(&AnalysisRecord::unsupported()).unwrap();
        let pipeline = AnalysisPipeline::new(Arc::new(StaticGateway::new(reply)));
        let record = pipeline
            .analyze(b"Preheat the oven to 200C.", "txt")
            .await
            .unwrap();
        assert_eq!(record, AnalysisRecord::unsupported());
    }

    #[tokio::test]
    async fn test_unsupported_tag_skips_gateway() {
        let gateway = RecordingGateway::replying(EARNINGS_REPLY);
        let pipeline = AnalysisPipeline::new(gateway.clone());
        let err = pipeline.analyze(b"slides", "pptx").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_inputs_skip_gateway() {
        let gateway = RecordingGateway::replying(EARNINGS_REPLY);
        let pipeline = AnalysisPipeline::new(gateway.clone());

        let inputs = [
            (b" \n\t ".to_vec(), SourceFormat::PlainText),
            (docx_with_paragraphs(&["", "  "]), SourceFormat::Docx),
            (pdf_with_pages(&[None]), SourceFormat::Pdf),
        ];
        for (bytes, format) in inputs {
            let err = pipeline.analyze_document(&bytes, format).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ExtractionEmpty, "{}", format);
        }
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_undecodable_bytes() {
        let gateway = RecordingGateway::replying(EARNINGS_REPLY);
        let pipeline = AnalysisPipeline::new(gateway.clone());
        let err = pipeline.analyze(&[0xff, 0xfe, 0x00], "txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodingFailure);
        assert_eq!(gateway.calls(), 0);
    }

    #[tokio::test]
    async fn test_gateway_failure_is_upstream() {
        let pipeline = AnalysisPipeline::new(RecordingGateway::failing("connection refused"));
        let err = pipeline.analyze(b"Revenue grew.", "txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UpstreamFailure);
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_malformed_reply_keeps_cleaned_text() {
        let pipeline = AnalysisPipeline::new(Arc::new(StaticGateway::new(
            "```json\n{\"document_type\": \n```",
        )));
        let err = pipeline.analyze(b"Revenue grew.", "txt").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedCompletionReply);
        assert_eq!(err.raw_output(), Some("{\"document_type\":"));
    }

    #[tokio::test]
    async fn test_schema_violation_names_field() {
        let reply = EARNINGS_REPLY.replace(", \"capex\": \"Not Mentioned\"", "");
        let pipeline = AnalysisPipeline::new(Arc::new(StaticGateway::new(reply)));
        match pipeline.analyze(b"Revenue grew.", "txt").await {
            Err(AnalysisError::SchemaViolation { field, .. }) => {
                assert_eq!(field, "forward_guidance.capex")
            }
            other => panic!("expected schema violation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_prompt_uses_configured_budget() {
        let gateway = RecordingGateway::replying(EARNINGS_REPLY);
        let mut config = EarnscanConfig::default();
        config.prompt.max_excerpt_chars = 7;
        let pipeline = AnalysisPipeline::from_config(&config, gateway.clone());

        pipeline
            .analyze_upload("call.txt", b"Revenue grew strongly")
            .await
            .unwrap();
        let prompts = gateway.prompts.lock().unwrap();
        assert!(prompts[0].ends_with("Revenue\n"));
    }

    #[tokio::test]
    async fn test_upload_policy_applies_first() {
        let gateway = RecordingGateway::replying(EARNINGS_REPLY);
        let mut config = EarnscanConfig::default();
        config.upload.max_file_size_bytes = 4;
        let pipeline = AnalysisPipeline::from_config(&config, gateway.clone());

        let err = pipeline.analyze_upload("call.txt", b"12345").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PayloadTooLarge);
        let err = pipeline.analyze_upload("call.csv", b"1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(gateway.calls(), 0);
    }

    #[test]
    fn test_build_prompt_without_gateway_call() {
        let gateway = RecordingGateway::replying(EARNINGS_REPLY);
        let pipeline = AnalysisPipeline::new(gateway.clone());
        let prompt = pipeline.build_prompt("call.txt", b"Margins held").unwrap();
        assert!(prompt.as_str().ends_with("Margins held\n"));
        assert_eq!(gateway.calls(), 0);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(Stage::PromptBuilt.to_string(), "prompt_built");
        assert_eq!(Stage::CompletionObtained.to_string(), "completion_obtained");
    }
}
