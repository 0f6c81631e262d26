//! Analysis prompt construction.
//!
//! The prompt is the fixed instruction block followed by a document excerpt.
//! The instruction block is always sent in full; only the excerpt is
//! truncated.
//!
//! Truncation counts Unicode scalar values (`char`s), not bytes, tokens or
//! graphemes. It may cut mid-sentence, mid-word, or between the code points
//! of a combined grapheme. The same input always yields the same prompt.

use tracing::debug;

/// Default maximum number of document characters placed in the prompt.
pub const DEFAULT_MAX_EXCERPT_CHARS: usize = 12_000;

/// Instruction block sent ahead of every document excerpt.
pub const INSTRUCTIONS: &str = r#"
You are a financial research analyst.

FIRST determine if the document is an earnings call transcript
or management discussion related to company performance.

If it is NOT an earnings-related document, return:

{
  "document_type": "Unsupported",
  "management_tone": "Not Applicable",
  "confidence_level": "Low",
  "confidence_reasoning": "The document does not contain earnings-related discussion.",
  "key_positives": [],
  "key_concerns": [],
  "forward_guidance": {
    "revenue": "Not Mentioned",
    "margin": "Not Mentioned",
    "capex": "Not Mentioned"
  },
  "capacity_utilization": "Not Mentioned",
  "growth_initiatives": []
}

If it IS an earnings transcript, return:

{
  "document_type": "Earnings Transcript",
  "management_tone": "Optimistic | Neutral | Cautious | Pessimistic",
  "confidence_level": "High | Medium | Low",
  "confidence_reasoning": "Explain briefly why this confidence level was assigned.",
  "key_positives": [],
  "key_concerns": [],
  "forward_guidance": {
    "revenue": "",
    "margin": "",
    "capex": ""
  },
  "capacity_utilization": "",
  "growth_initiatives": []
}

Rules:
- Do NOT hallucinate
- If guidance not present → "Not Mentioned"
- Return ONLY valid JSON
- Do NOT wrap in markdown

Transcript:
"#;

/// A fully built prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt {
    text: String,
    excerpt_chars: usize,
    truncated: bool,
}

impl AnalysisPrompt {
    /// Prompt text as sent to the completion service.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of document characters included.
    pub fn excerpt_chars(&self) -> usize {
        self.excerpt_chars
    }

    /// Whether the document was cut to fit.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }

    /// Consume the prompt, returning its text.
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Builds analysis prompts from extracted text.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_excerpt_chars: usize,
}

impl PromptBuilder {
    /// Create a builder with the default excerpt budget.
    pub fn new() -> Self {
        Self {
            max_excerpt_chars: DEFAULT_MAX_EXCERPT_CHARS,
        }
    }

    /// Set the excerpt budget in characters.
    pub fn with_max_excerpt_chars(mut self, max_chars: usize) -> Self {
        self.max_excerpt_chars = max_chars;
        self
    }

    /// Build the prompt for `text`.
    pub fn build(&self, text: &str) -> AnalysisPrompt {
        let excerpt = truncate_chars(text, self.max_excerpt_chars);
        let excerpt_chars = excerpt.chars().count();
        let truncated = excerpt.len() < text.len();

        if truncated {
            debug!(
                "Truncated document excerpt to {} characters",
                self.max_excerpt_chars
            );
        }

        let mut prompt = String::with_capacity(INSTRUCTIONS.len() + excerpt.len() + 1);
        prompt.push_str(INSTRUCTIONS);
        prompt.push_str(excerpt);
        prompt.push('\n');

        AnalysisPrompt {
            text: prompt,
            excerpt_chars,
            truncated,
        }
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// First `max_chars` characters of `text`.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_is_deterministic() {
        let builder = PromptBuilder::new();
        let a = builder.build("Revenue grew 12% with strong margins.");
        let b = builder.build("Revenue grew 12% with strong margins.");
        assert_eq!(a.as_str().as_bytes(), b.as_str().as_bytes());
    }

    #[test]
    fn test_excerpt_follows_instructions() {
        let prompt = PromptBuilder::new().build("Hello");
        assert_eq!(prompt.as_str(), format!("{}Hello\n", INSTRUCTIONS));
        assert!(!prompt.was_truncated());
        assert_eq!(prompt.excerpt_chars(), 5);
    }

    #[test]
    fn test_truncates_to_exact_char_budget() {
        let text = "a".repeat(DEFAULT_MAX_EXCERPT_CHARS + 500);
        let prompt = PromptBuilder::new().build(&text);
        assert!(prompt.was_truncated());
        assert_eq!(prompt.excerpt_chars(), DEFAULT_MAX_EXCERPT_CHARS);

        let excerpt = prompt.as_str().strip_prefix(INSTRUCTIONS).unwrap();
        assert_eq!(excerpt.trim_end_matches('\n').chars().count(), 12_000);
    }

    #[test]
    fn test_truncation_counts_chars_not_bytes() {
        let prompt = PromptBuilder::new()
            .with_max_excerpt_chars(3)
            .build("€€€€€");
        let excerpt = prompt.as_str().strip_prefix(INSTRUCTIONS).unwrap();
        assert_eq!(excerpt, "€€€\n");
    }

    #[test]
    fn test_exact_length_is_not_truncated() {
        let prompt = PromptBuilder::new().with_max_excerpt_chars(4).build("abcd");
        assert!(!prompt.was_truncated());
    }

    #[test]
    fn test_instructions_carry_rules() {
        assert!(INSTRUCTIONS.contains("Do NOT hallucinate"));
        assert!(INSTRUCTIONS.contains("\"Not Mentioned\""));
        assert!(INSTRUCTIONS.contains("Return ONLY valid JSON"));
        assert!(INSTRUCTIONS.contains("Do NOT wrap in markdown"));
    }
}
