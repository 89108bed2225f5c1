//! Content fingerprints and the per-run duplicate table.

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Hex-encoded SHA-256 of raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Result of registering a fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fingerprint {
    /// First time this hash is seen in the run
    Unique,
    /// Hash already claimed by `original`
    Duplicate { original: PathBuf },
}

/// Hash → first-seen path. Lives for one run only.
///
/// Callers register documents in discovery order; the first path to claim a
/// hash stays canonical and every later match resolves to it.
#[derive(Debug, Default)]
pub struct FingerprintTable {
    seen: HashMap<String, PathBuf>,
}

impl FingerprintTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, hash: &str, path: &Path) -> Fingerprint {
        match self.seen.get(hash) {
            Some(original) => Fingerprint::Duplicate { original: original.clone() },
            None => {
                self.seen.insert(hash.to_string(), path.to_path_buf());
                Fingerprint::Unique
            }
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
