//! DOCX paragraph text using zip and quick-xml.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, trace};
use zip::ZipArchive;

use super::{Result, TextExtractor};
use crate::error::ExtractionError;

/// Main document part inside the OOXML package.
const DOCUMENT_PART: &str = "word/document.xml";

/// Refuse to inflate a document part larger than this.
const MAX_DOCUMENT_PART_BYTES: u64 = 64 * 1024 * 1024;

/// Extracts body paragraphs in document order, joined with `\n`.
///
/// Only top-level body paragraphs are read. Table cells and text boxes are
/// skipped, as are headers, footers and footnotes, which live in other parts.
/// Within a paragraph, `w:tab` becomes `\t` and `w:br`/`w:cr` become `\n`.
pub struct DocxExtractor;

impl DocxExtractor {
    fn read_document_part(data: &[u8]) -> Result<String> {
        let mut archive =
            ZipArchive::new(Cursor::new(data)).map_err(|e| ExtractionError::Docx(e.to_string()))?;

        let part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|e| ExtractionError::Docx(format!("{}: {}", DOCUMENT_PART, e)))?;

        if part.size() > MAX_DOCUMENT_PART_BYTES {
            return Err(ExtractionError::Docx(format!(
                "{} is {} bytes uncompressed, limit is {}",
                DOCUMENT_PART,
                part.size(),
                MAX_DOCUMENT_PART_BYTES
            )));
        }

        let mut xml = String::new();
        part.take(MAX_DOCUMENT_PART_BYTES)
            .read_to_string(&mut xml)
            .map_err(|e| ExtractionError::Docx(format!("{}: {}", DOCUMENT_PART, e)))?;

        trace!("Read {} bytes of {}", xml.len(), DOCUMENT_PART);
        Ok(xml)
    }
}

impl TextExtractor for DocxExtractor {
    fn extract(&self, data: &[u8]) -> Result<String> {
        let xml = Self::read_document_part(data)?;
        let paragraphs = body_paragraphs(&xml)?;
        debug!("DOCX has {} body paragraphs", paragraphs.len());
        Ok(paragraphs.join("\n"))
    }
}

/// Walk `document.xml` and collect the text of each body paragraph.
fn body_paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    // Depth inside tables and text boxes, whose paragraphs are not body paragraphs.
    let mut nested = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            ExtractionError::Docx(format!(
                "malformed {} at byte {}: {}",
                DOCUMENT_PART,
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"tbl" | b"txbxContent" => nested += 1,
                b"p" if nested == 0 => current = Some(String::new()),
                b"r" => in_run = true,
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => {
                let ch = match e.local_name().as_ref() {
                    b"p" if nested == 0 => {
                        paragraphs.push(String::new());
                        None
                    }
                    b"tab" if in_run => Some('\t'),
                    b"br" | b"cr" if in_run => Some('\n'),
                    _ => None,
                };
                if let (Some(ch), Some(paragraph), 0) = (ch, current.as_mut(), nested) {
                    paragraph.push(ch);
                }
            }
            Event::Text(t) if in_text && nested == 0 => {
                if let Some(paragraph) = current.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| ExtractionError::Docx(e.to_string()))?;
                    paragraph.push_str(&text);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"tbl" | b"txbxContent" => nested = nested.saturating_sub(1),
                b"p" if nested == 0 => {
                    if let Some(paragraph) = current.take() {
                        paragraphs.push(paragraph);
                    }
                }
                b"r" => in_run = false,
                b"t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}
