//! PDF text extraction.

use crate::error::ExtractionError;
use crate::models::SourceDocument;

/// Obtains raw text from a source document.
///
/// The pipeline treats extraction as a black box: any failure here isolates
/// the one document and the run moves on.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, document: &SourceDocument) -> Result<String, ExtractionError>;
}

/// Extractor backed by the `pdf-extract` crate.
#[derive(Debug, Default)]
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn extract(&self, document: &SourceDocument) -> Result<String, ExtractionError> {
        let bytes = std::fs::read(&document.path)
            .map_err(|e| ExtractionError::ReadError(e.to_string()))?;

        let text = pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| ExtractionError::ParseError(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(ExtractionError::EmptyText);
        }

        Ok(text)
    }
}
