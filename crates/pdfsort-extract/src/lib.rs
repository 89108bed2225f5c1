//! pdfsort-extract
//!
//! Plain-text extraction from PDF files via `pdf-extract`. Only the text layer
//! is read: scanned image-only documents come back empty and no OCR is attempted.

use std::path::Path;

use pdfsort_core::error::{Error, Result};
use pdfsort_core::traits::TextExtractor;

mod sampling;

pub use sampling::sample_pages;

#[derive(Debug, Clone, Default)]
pub struct PdfTextExtractor {
    /// 0 keeps every page.
    sample_pages: usize,
}

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sample_pages(sample_pages: usize) -> Self {
        Self { sample_pages }
    }

    pub fn extract_pages(&self, path: &Path, bytes: &[u8]) -> Result<Vec<String>> {
        if bytes.is_empty() {
            return Err(Error::unreadable(path, "empty file"));
        }
        // The parser (and its font handling) can panic on malformed input
        let pages = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        })) {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                tracing::debug!(path = %path.display(), error = %e, "pdf extraction failed");
                return Err(Error::unreadable(path, e));
            }
            Err(_) => {
                tracing::error!(path = %path.display(), "pdf parser panicked");
                return Err(Error::unreadable(path, "pdf parser panicked"));
            }
        };
        Ok(sample_pages(pages, self.sample_pages))
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path, bytes: &[u8]) -> Result<String> {
        let pages = self.extract_pages(path, bytes)?;
        let text = pages
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
        Ok(text)
    }
}
