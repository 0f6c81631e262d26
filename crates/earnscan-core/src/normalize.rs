//! Removal of decorative wrappers from completion replies.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

lazy_static! {
    // Opening fence with an optional language tag on the same line.
    static ref LEADING_FENCE: Regex = Regex::new(
        r"\A```[ \t]*[A-Za-z0-9_+.\-]*[ \t]*(?:\r?\n)?"
    ).unwrap();

    static ref TRAILING_FENCE: Regex = Regex::new(
        r"(?:\r?\n)?[ \t]*```\z"
    ).unwrap();
}

/// Strips surrounding whitespace and code fences from a raw reply.
///
/// The completion service is told not to wrap its answer, but compliance is
/// not guaranteed. Only the outer wrapper is removed; nothing inside the
/// payload is touched or repaired. Stripping repeats until nothing changes,
/// so normalizing an already-normalized reply returns it unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseNormalizer;

impl ResponseNormalizer {
    /// Normalize a raw reply.
    pub fn normalize(&self, raw: &str) -> String {
        let trimmed = raw.trim();
        let mut current = trimmed;
        loop {
            let stripped = strip_fences(current);
            if stripped.len() == current.len() {
                break;
            }
            current = stripped;
        }
        if current.len() != trimmed.len() {
            warn!("Completion reply was wrapped in a code fence");
        }
        current.to_string()
    }
}

fn strip_fences(text: &str) -> &str {
    let mut out = text;
    if let Some(m) = LEADING_FENCE.find(out) {
        out = &out[m.end()..];
    }
    if let Some(m) = TRAILING_FENCE.find(out) {
        out = &out[..m.start()];
    }
    out.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn normalize(raw: &str) -> String {
        ResponseNormalizer.normalize(raw)
    }

    #[test]
    fn test_plain_json_only_trimmed() {
        assert_eq!(normalize("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_json_fence() {
        assert_eq!(normalize("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_bare_fence() {
        assert_eq!(normalize("```\n{\"a\": 1}\n```\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_fence_without_newline() {
        assert_eq!(normalize("```json{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn test_crlf_fence() {
        assert_eq!(normalize("```JSON\r\n{\"a\": 1}\r\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_inner_backticks_untouched() {
        let raw = "{\"note\": \"use ``` for code\"}";
        assert_eq!(normalize(raw), raw);
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "```json\n{\"a\": 1}\n```",
            "``````json\n{}\n``````",
            "```\n```json\n{}\n```\n```",
            "  not json at all ",
            "",
        ];
        for raw in samples {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", raw);
        }
    }
}
