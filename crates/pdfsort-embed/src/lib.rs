//! pdfsort-embed
//!
//! Text embedders used by the topic model. `HashingEmbedder` needs no model
//! files and is the default; `BgeM3Embedder` runs BGE-M3 on candle.

use std::path::Path;

use pdfsort_core::config::EmbedderKind;
use pdfsort_core::traits::Embedder;

pub mod analysis;
mod bge;
mod device;
mod hashing;
mod pool;
mod tokenize;

pub use analysis::TermAnalyzer;
pub use bge::{resolve_model_dir, BgeM3Embedder, BGE_M3_DIM};
pub use device::select_device;
pub use hashing::HashingEmbedder;
pub use pool::masked_mean_l2;

/// Build the configured embedder. A model that cannot be loaded degrades to hashing.
pub fn load_embedder(kind: EmbedderKind, model_dir: Option<&Path>, hashing_dim: usize) -> Box<dyn Embedder> {
    if std::env::var("APP_USE_FAKE_EMBEDDINGS").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true")) {
        tracing::info!("APP_USE_FAKE_EMBEDDINGS set, using hashing embedder");
        return Box::new(HashingEmbedder::new(hashing_dim));
    }
    match kind {
        EmbedderKind::Hashing => Box::new(HashingEmbedder::new(hashing_dim)),
        EmbedderKind::BgeM3 => match resolve_model_dir(model_dir).and_then(|dir| BgeM3Embedder::load(&dir)) {
            Ok(model) => Box::new(model),
            Err(e) => {
                tracing::warn!("BGE-M3 unavailable ({}), falling back to hashing embedder", e);
                Box::new(HashingEmbedder::new(hashing_dim))
            }
        },
    }
}
