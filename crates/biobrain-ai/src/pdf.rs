//! PDF text extraction.

use std::path::Path;

use lopdf::Document;

use crate::error::{AiError, Result};

/// Best-effort plain text from the first pages of a PDF.
pub trait PdfTextSource {
    fn extract_text(&self, bytes: &[u8], max_pages: usize) -> Result<String>;
}

/// In-process extraction with lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfTextSource;

impl PdfTextSource for LopdfTextSource {
    fn extract_text(&self, bytes: &[u8], max_pages: usize) -> Result<String> {
        if max_pages == 0 {
            return Err(AiError::Extraction("page limit is zero".to_string()));
        }

        let document = Document::load_mem(bytes)
            .map_err(|err| AiError::Extraction(format!("lopdf failed to open PDF: {err}")))?;
        let page_numbers: Vec<u32> = document.get_pages().keys().copied().take(max_pages).collect();
        if page_numbers.is_empty() {
            return Err(AiError::Extraction("PDF has no pages".to_string()));
        }

        let text = document.extract_text(&page_numbers).map_err(|err| {
            AiError::Extraction(format!("lopdf failed to extract text: {err}"))
        })?;

        if text.trim().is_empty() {
            return Err(AiError::Extraction(format!(
                "no text found in the first {} page(s); the PDF may be scanned",
                page_numbers.len()
            )));
        }

        tracing::debug!(pages = page_numbers.len(), chars = text.len(), "extracted PDF text");
        Ok(text)
    }
}

/// Reads a PDF from disk. An unreadable file is an extraction failure.
pub fn read_pdf(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|err| AiError::Extraction(format!("cannot read {}: {err}", path.display())))
}
