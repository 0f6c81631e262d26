//! Validated analysis record returned by the pipeline.
//!
//! Field names follow the JSON keys the completion service is asked to
//! produce. The discriminant and the tone/confidence labels are kept as
//! open string enums: any string the service returns is preserved, and the
//! documented values get their own variants for matching.

use serde::{Deserialize, Serialize};

/// Sentinel for guidance that the document does not state.
pub const NOT_MENTIONED: &str = "Not Mentioned";

/// Sentinel tone for documents that are not earnings-related.
pub const NOT_APPLICABLE: &str = "Not Applicable";

/// Confidence reasoning used for unsupported documents.
pub const UNSUPPORTED_REASONING: &str =
    "The document does not contain earnings-related discussion.";

macro_rules! open_string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
            /// Any other value returned by the completion service.
            Other(String),
        }

        impl $name {
            /// Wire representation.
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $text,)+
                    Self::Other(s) => s.as_str(),
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                match s.as_str() {
                    $($text => Self::$variant,)+
                    _ => Self::Other(s),
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::from(s.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(s) => s,
                    other => other.as_str().to_string(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

open_string_enum! {
    /// Which of the two output shapes the reply claims to be.
    pub enum DocumentType {
        /// Not an earnings-related document.
        Unsupported => "Unsupported",
        /// Earnings call transcript or management discussion.
        EarningsTranscript => "Earnings Transcript",
    }
}

open_string_enum! {
    /// Overall tone of management commentary.
    pub enum ManagementTone {
        Optimistic => "Optimistic",
        Neutral => "Neutral",
        Cautious => "Cautious",
        Pessimistic => "Pessimistic",
        /// Used by the unsupported shape.
        NotApplicable => "Not Applicable",
    }
}

open_string_enum! {
    /// How confident the analysis is.
    pub enum ConfidenceLevel {
        High => "High",
        Medium => "Medium",
        Low => "Low",
    }
}

/// Forward-looking guidance by topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardGuidance {
    pub revenue: String,
    pub margin: String,
    pub capex: String,
}

impl ForwardGuidance {
    /// Guidance with every topic marked "Not Mentioned".
    pub fn not_mentioned() -> Self {
        Self {
            revenue: NOT_MENTIONED.to_string(),
            margin: NOT_MENTIONED.to_string(),
            capex: NOT_MENTIONED.to_string(),
        }
    }
}

/// Whether a guidance-style field carries a real statement.
pub fn is_mentioned(value: &str) -> bool {
    value != NOT_MENTIONED
}

/// A validated analysis of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub document_type: DocumentType,
    pub management_tone: ManagementTone,
    pub confidence_level: ConfidenceLevel,
    pub confidence_reasoning: String,
    pub key_positives: Vec<String>,
    pub key_concerns: Vec<String>,
    pub forward_guidance: ForwardGuidance,
    pub capacity_utilization: String,
    pub growth_initiatives: Vec<String>,
}

impl AnalysisRecord {
    /// The fixed record for documents that are not earnings-related.
    pub fn unsupported() -> Self {
        Self {
            document_type: DocumentType::Unsupported,
            management_tone: ManagementTone::NotApplicable,
            confidence_level: ConfidenceLevel::Low,
            confidence_reasoning: UNSUPPORTED_REASONING.to_string(),
            key_positives: Vec::new(),
            key_concerns: Vec::new(),
            forward_guidance: ForwardGuidance::not_mentioned(),
            capacity_utilization: NOT_MENTIONED.to_string(),
            growth_initiatives: Vec::new(),
        }
    }

    /// Whether the service classified the document as unsupported.
    pub fn is_unsupported(&self) -> bool {
        self.document_type == DocumentType::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_open_enum_known_and_other() {
        assert_eq!(ManagementTone::from("Cautious"), ManagementTone::Cautious);
        assert_eq!(
            ManagementTone::from("Bullish"),
            ManagementTone::Other("Bullish".to_string())
        );
        assert_eq!(
            DocumentType::from("Earnings Transcript"),
            DocumentType::EarningsTranscript
        );
    }

    #[test]
    fn test_serializes_as_plain_strings() {
        let record = AnalysisRecord::unsupported();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["document_type"], "Unsupported");
        assert_eq!(value["management_tone"], "Not Applicable");
        assert_eq!(value["confidence_level"], "Low");
        assert_eq!(value["forward_guidance"]["capex"], "Not Mentioned");
        assert_eq!(value["key_positives"], serde_json::json!([]));
    }

    #[test]
    fn test_other_value_survives_serialization() {
        let mut record = AnalysisRecord::unsupported();
        record.document_type = DocumentType::from("Press Release");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["document_type"], "Press Release");
    }

    #[test]
    fn test_is_mentioned() {
        assert!(!is_mentioned(NOT_MENTIONED));
        assert!(is_mentioned("Mid-single-digit growth"));
    }
}
