//! Plain UTF-8 text.

use super::{Result, TextExtractor};

/// Decodes the bytes as UTF-8, verbatim.
///
/// Invalid UTF-8 is reported as an error rather than replaced, so a
/// mis-declared binary file never reaches the completion service as mojibake.
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, data: &[u8]) -> Result<String> {
        Ok(std::str::from_utf8(data)?.to_string())
    }
}
