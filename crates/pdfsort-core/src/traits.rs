use std::path::Path;

use crate::error::Result;

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Pulls plain text out of a document. Implementations must not modify the file.
///
/// Returns `Error::UnreadableDocument` when the file cannot be opened or parsed;
/// an empty string is a valid result for documents without a text layer.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path, bytes: &[u8]) -> Result<String>;
}

pub trait LanguageDetector: Send + Sync {
    /// Folder-ready language label, or `"unknown"`.
    fn detect(&self, text: &str) -> String;
}
