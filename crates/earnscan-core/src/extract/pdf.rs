//! PDF text extraction using lopdf and pdf-extract.

use std::panic::{self, AssertUnwindSafe};

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{Result, TextExtractor};
use crate::error::ExtractionError;

/// PDF text extractor.
///
/// Text is read page by page with lopdf. When lopdf finds no text on any page
/// (fonts it cannot decode, for instance), pdf-extract is tried as a fallback.
/// A page without extractable text contributes nothing; only a document with
/// no text at all comes back empty.
pub struct PdfExtractor {
    /// Try pdf-extract when lopdf yields nothing.
    fallback: bool,
}

/// Text from a single PDF page.
#[derive(Debug, Clone)]
pub struct PdfPage {
    /// Page number (1-indexed).
    pub number: u32,
    /// Extracted text from this page.
    pub text: String,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self { fallback: true }
    }

    /// Enable or disable the pdf-extract fallback.
    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    /// Load a document, decrypting it if it uses an empty password.
    fn load(data: &[u8]) -> Result<(Document, Option<Vec<u8>>)> {
        let mut doc = Document::load_mem(data).map_err(|e| ExtractionError::Pdf(e.to_string()))?;

        let mut decrypted = None;
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(ExtractionError::Pdf("PDF is encrypted".to_string()));
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut buf = Vec::new();
            doc.save_to(&mut buf)
                .map_err(|e| ExtractionError::Pdf(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted = Some(buf);
        }

        if doc.get_pages().is_empty() {
            return Err(ExtractionError::Pdf("PDF has no pages".to_string()));
        }

        Ok((doc, decrypted))
    }

    /// Extract text from every page, in page order.
    pub fn extract_pages(&self, data: &[u8]) -> Result<Vec<PdfPage>> {
        let (doc, decrypted) = Self::load(data)?;

        let mut pages: Vec<PdfPage> = doc
            .get_pages()
            .into_keys()
            .map(|number| {
                let text = doc.extract_text(&[number]).unwrap_or_else(|e| {
                    warn!("Failed to extract text from page {}: {}", number, e);
                    String::new()
                });
                trace!("Page {}: {} chars", number, text.len());
                PdfPage { number, text }
            })
            .collect();

        debug!("Loaded PDF with {} pages", pages.len());

        if self.fallback && pages.iter().all(|p| p.text.trim().is_empty()) {
            let raw = decrypted.as_deref().unwrap_or(data);
            if let Some(texts) = fallback_pages(raw) {
                if texts.len() == pages.len() {
                    for (page, text) in pages.iter_mut().zip(texts) {
                        page.text = text;
                    }
                } else {
                    debug!(
                        "pdf-extract returned {} pages for a {} page document, using it as one block",
                        texts.len(),
                        pages.len()
                    );
                    pages = vec![PdfPage {
                        number: 1,
                        text: texts.concat(),
                    }];
                }
            }
        }

        Ok(pages)
    }
}

/// Page texts from pdf-extract, or `None` if it fails.
///
/// pdf-extract panics on some malformed inputs; a panic is treated like an
/// error.
fn fallback_pages(data: &[u8]) -> Option<Vec<String>> {
    debug!("No text from lopdf, trying pdf-extract");
    match panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(data)
    })) {
        Ok(Ok(texts)) => Some(texts),
        Ok(Err(e)) => {
            warn!("pdf-extract failed: {}", e);
            None
        }
        Err(_) => {
            warn!("pdf-extract panicked");
            None
        }
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, data: &[u8]) -> Result<String> {
        let pages = self.extract_pages(data)?;
        Ok(pages.into_iter().map(|p| p.text).collect())
    }
}
