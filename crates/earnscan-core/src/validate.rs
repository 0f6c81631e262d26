//! Parsing and structural validation of completion replies.
//!
//! Validation is fail-fast: the first missing or mistyped field is reported
//! and nothing is accepted partially. Fields are checked in schema order.
//!
//! Deliberately permissive: `document_type`, `management_tone` and
//! `confidence_level` may hold any string. Values outside the documented
//! labels are kept as `Other(..)` rather than rejected. Unknown top-level keys
//! are ignored. The one shape-specific rule is that a reply claiming
//! `"Unsupported"` must carry the fixed sentinel values of that shape.
//!
//! Known gap: `confidence_reasoning` is only checked to be a string, so an
//! empty reasoning is accepted even for an earnings transcript.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::models::analysis::{
    AnalysisRecord, ConfidenceLevel, ForwardGuidance, ManagementTone, NOT_APPLICABLE,
    NOT_MENTIONED,
};

/// Sub-fields of `forward_guidance`, all required, no others allowed.
const GUIDANCE_FIELDS: [&str; 3] = ["revenue", "margin", "capex"];

/// Validates cleaned replies against the analysis schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl SchemaValidator {
    /// Parse and validate a cleaned reply.
    pub fn validate(&self, cleaned: &str) -> Result<AnalysisRecord> {
        let value: Value =
            serde_json::from_str(cleaned).map_err(|e| AnalysisError::MalformedCompletionReply {
                raw: cleaned.to_string(),
                reason: e.to_string(),
            })?;

        let record = record_from_value(&value)?;
        if record.is_unsupported() {
            check_unsupported_shape(&record)?;
        }

        debug!(
            "Validated reply: document_type={}, tone={}, confidence={}",
            record.document_type, record.management_tone, record.confidence_level
        );
        Ok(record)
    }
}

fn record_from_value(value: &Value) -> Result<AnalysisRecord> {
    let obj = value.as_object().ok_or_else(|| {
        AnalysisError::schema("$", format!("expected object, found {}", json_type(value)))
    })?;

    Ok(AnalysisRecord {
        document_type: string_field(obj, "document_type", "document_type")?.into(),
        management_tone: string_field(obj, "management_tone", "management_tone")?.into(),
        confidence_level: string_field(obj, "confidence_level", "confidence_level")?.into(),
        confidence_reasoning: string_field(obj, "confidence_reasoning", "confidence_reasoning")?,
        key_positives: string_list_field(obj, "key_positives")?,
        key_concerns: string_list_field(obj, "key_concerns")?,
        forward_guidance: guidance_field(obj)?,
        capacity_utilization: string_field(obj, "capacity_utilization", "capacity_utilization")?,
        growth_initiatives: string_list_field(obj, "growth_initiatives")?,
    })
}

fn required<'a>(obj: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a Value> {
    obj.get(key)
        .ok_or_else(|| AnalysisError::schema(path, "required field is missing"))
}

fn string_field(obj: &Map<String, Value>, key: &str, path: &str) -> Result<String> {
    match required(obj, key, path)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(AnalysisError::schema(
            path,
            format!("expected string, found {}", json_type(other)),
        )),
    }
}

fn string_list_field(obj: &Map<String, Value>, key: &str) -> Result<Vec<String>> {
    let items = match required(obj, key, key)? {
        Value::Array(items) => items,
        other => {
            return Err(AnalysisError::schema(
                key,
                format!("expected list of strings, found {}", json_type(other)),
            ))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(AnalysisError::schema(
                format!("{}[{}]", key, i),
                format!("expected string, found {}", json_type(other)),
            )),
        })
        .collect()
}

fn guidance_field(obj: &Map<String, Value>) -> Result<ForwardGuidance> {
    let guidance = match required(obj, "forward_guidance", "forward_guidance")? {
        Value::Object(map) => map,
        other => {
            return Err(AnalysisError::schema(
                "forward_guidance",
                format!("expected object, found {}", json_type(other)),
            ))
        }
    };

    let revenue = string_field(guidance, "revenue", "forward_guidance.revenue")?;
    let margin = string_field(guidance, "margin", "forward_guidance.margin")?;
    let capex = string_field(guidance, "capex", "forward_guidance.capex")?;

    if let Some(extra) = guidance.keys().find(|k| !GUIDANCE_FIELDS.contains(&k.as_str())) {
        return Err(AnalysisError::schema(
            format!("forward_guidance.{}", extra),
            "unexpected field",
        ));
    }

    Ok(ForwardGuidance {
        revenue,
        margin,
        capex,
    })
}

/// The unsupported shape has fixed values everywhere but the reasoning text.
fn check_unsupported_shape(record: &AnalysisRecord) -> Result<()> {
    let expect = |ok: bool, field: &str, expected: &str| {
        if ok {
            Ok(())
        } else {
            Err(AnalysisError::schema(
                field,
                format!("unsupported documents must have {}", expected),
            ))
        }
    };

    let not_mentioned = format!("\"{}\"", NOT_MENTIONED);
    expect(
        record.management_tone == ManagementTone::NotApplicable,
        "management_tone",
        &format!("\"{}\"", NOT_APPLICABLE),
    )?;
    expect(
        record.confidence_level == ConfidenceLevel::Low,
        "confidence_level",
        "\"Low\"",
    )?;
    expect(record.key_positives.is_empty(), "key_positives", "an empty list")?;
    expect(record.key_concerns.is_empty(), "key_concerns", "an empty list")?;

    let guidance = &record.forward_guidance;
    expect(
        guidance.revenue == NOT_MENTIONED,
        "forward_guidance.revenue",
        &not_mentioned,
    )?;
    expect(
        guidance.margin == NOT_MENTIONED,
        "forward_guidance.margin",
        &not_mentioned,
    )?;
    expect(
        guidance.capex == NOT_MENTIONED,
        "forward_guidance.capex",
        &not_mentioned,
    )?;
    expect(
        record.capacity_utilization == NOT_MENTIONED,
        "capacity_utilization",
        &not_mentioned,
    )?;
    expect(
        record.growth_initiatives.is_empty(),
        "growth_initiatives",
        "an empty list",
    )
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
