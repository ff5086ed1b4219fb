//! The seam between extracted PDF text and a metadata suggestion.

use biobrain_core::ExtractedMetadata;

use crate::error::Result;
use crate::pdf::PdfTextSource;

/// Turns a paper's plain text into suggested bibliographic fields.
pub trait MetadataExtractor {
    fn extract(&self, text: &str) -> Result<ExtractedMetadata>;
}

/// Extracts text from the first `max_pages` pages of `pdf` and asks
/// `extractor` for metadata.
///
/// Nothing is persisted; the caller merges the result into its draft.
pub fn analyze_pdf(
    pdf: &[u8],
    source: &dyn PdfTextSource,
    extractor: &dyn MetadataExtractor,
    max_pages: usize,
) -> Result<ExtractedMetadata> {
    let text = source.extract_text(pdf, max_pages)?;
    tracing::info!(chars = text.chars().count(), "analyzing PDF text");
    extractor.extract(&text)
}
