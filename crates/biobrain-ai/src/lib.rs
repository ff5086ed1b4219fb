//! BioBrain AI: reading text out of PDFs and turning it into suggested
//! bibliographic fields through a hosted LLM.

pub mod error;
pub mod extractor;
pub mod gemini;
pub mod pdf;
pub mod response;

pub use error::{AiError, Result};
pub use extractor::{analyze_pdf, MetadataExtractor};
pub use gemini::GeminiExtractor;
pub use pdf::{read_pdf, LopdfTextSource, PdfTextSource};
pub use response::parse_extraction_reply;
