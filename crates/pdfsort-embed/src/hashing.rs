use std::hash::{Hash, Hasher};

use anyhow::Result;
use pdfsort_core::traits::Embedder;
use twox_hash::XxHash64;

use crate::analysis::TermAnalyzer;

/// Feature-hashed bag of words, L2-normalized.
///
/// Deterministic and model-free: each analyzed term is hashed with xxHash64 into one of `dim` buckets, with the top hash bit
/// choosing the sign. Counts are dampened with `ln(1 + tf)`.
pub struct HashingEmbedder {
    dim: usize,
    max_words: usize,
    analyzer: TermAnalyzer,
}

impl HashingEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim: dim.max(1), max_words: 4096, analyzer: TermAnalyzer::default() }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut counts = vec![0f32; self.dim];
        for word in self.analyzer.terms(text).into_iter().take(self.max_words) {
            let mut hasher = XxHash64::with_seed(0);
            word.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
            counts[idx] += sign;
        }
        let mut v: Vec<f32> = counts.into_iter().map(|c| c.signum() * c.abs().ln_1p()).collect();
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 1e-6 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl Embedder for HashingEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        self.max_words
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
