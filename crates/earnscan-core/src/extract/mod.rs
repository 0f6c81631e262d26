//! Format-dispatched text extraction.
//!
//! Each supported [`SourceFormat`] has one [`TextExtractor`]. Extractors only
//! read the bytes they are given; they keep nothing after returning. Whether
//! the result is usable (non-blank) is decided by the caller.

mod docx;
mod pdf;
mod plain;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;
pub use plain::PlainTextExtractor;

use tracing::debug;

use crate::error::ExtractionError;
use crate::models::document::{ExtractedDocument, SourceFormat};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for format-specific text extractors.
pub trait TextExtractor {
    /// Extract the text content of a document.
    fn extract(&self, data: &[u8]) -> Result<String>;
}

/// Extract text from `data` declared as `format`.
pub fn extract(data: &[u8], format: SourceFormat) -> Result<ExtractedDocument> {
    let text = match format {
        SourceFormat::Pdf => PdfExtractor::new().extract(data)?,
        SourceFormat::Docx => DocxExtractor.extract(data)?,
        SourceFormat::PlainText => PlainTextExtractor.extract(data)?,
    };

    debug!(
        "Extracted {} chars from {} byte {} document",
        text.chars().count(),
        data.len(),
        format
    );

    Ok(ExtractedDocument {
        text,
        source_format: format,
    })
}

/// Extract text from `data` declared by a free-form format tag.
///
/// Tags outside the supported set fail before any bytes are read.
pub fn extract_tagged(data: &[u8], tag: &str) -> Result<ExtractedDocument> {
    let format =
        SourceFormat::from_tag(tag).ok_or_else(|| ExtractionError::Unsupported(tag.to_string()))?;
    extract(data, format)
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Synthesised DOCX and PDF documents for tests.

    use std::io::{Cursor, Write};

    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Build a DOCX whose body is the given `word/document.xml` body markup.
    pub fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("[Content_Types].xml", options).unwrap();
        writer
            .write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
            .unwrap();
        writer.start_file("word/document.xml", options).unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    /// Build a DOCX with one plain paragraph per entry.
    pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
            .collect();
        docx_with_body(&body)
    }

    /// Build a PDF with one page per entry; `None` makes a page without text.
    pub fn pdf_with_pages(pages: &[Option<&str>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for page in pages {
            let operations = match page {
                Some(text) => vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 12.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
                None => vec![],
            };
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_text() {
        let doc = extract(b"Revenue grew 12%.", SourceFormat::PlainText).unwrap();
        assert_eq!(doc.text, "Revenue grew 12%.");
        assert_eq!(doc.source_format, SourceFormat::PlainText);
    }

    #[test]
    fn test_extract_tagged_rejects_unknown_format() {
        let err = extract_tagged(b"{\\rtf1}", "rtf").unwrap_err();
        assert!(matches!(err, ExtractionError::Unsupported(ref tag) if tag == "rtf"));
    }

    #[test]
    fn test_extract_tagged_dispatches_docx() {
        let data = fixtures::docx_with_paragraphs(&["Q3 results", "Margins expanded"]);
        let doc = extract_tagged(&data, ".docx").unwrap();
        assert_eq!(doc.text, "Q3 results\nMargins expanded");
        assert_eq!(doc.source_format, SourceFormat::Docx);
    }

    #[test]
    fn test_empty_content_is_blank_for_every_format() {
        let cases = [
            (Vec::new(), SourceFormat::PlainText),
            (fixtures::docx_with_body(""), SourceFormat::Docx),
            (fixtures::pdf_with_pages(&[None]), SourceFormat::Pdf),
        ];
        for (data, format) in cases {
            let doc = extract(&data, format).unwrap();
            assert!(doc.is_blank(), "{format} produced {:?}", doc.text);
        }
    }
}
