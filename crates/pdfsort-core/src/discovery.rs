//! Candidate discovery over the input directory.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use crate::config::SorterConfig;
use crate::error::{Error, Result};

/// Files found under the input root, in discovery order (sorted by path).
#[derive(Debug, Default, Clone)]
pub struct Discovered {
    pub files: Vec<PathBuf>,
    /// Matching names that are not regular files (symlinks, fifos, ...), with a reason.
    pub rejected: Vec<(PathBuf, String)>,
}

impl Discovered {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.rejected.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len() + self.rejected.len()
    }
}

#[derive(Debug, Clone)]
pub struct DocumentScanner {
    extensions: Vec<String>,
    recursive: bool,
    exclude: Option<PathBuf>,
}

impl DocumentScanner {
    pub fn new<I, S>(extensions: I, recursive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { extensions, recursive, exclude: None }
    }

    /// Scanner for the configured extensions that never descends into the output tree.
    pub fn from_config(config: &SorterConfig) -> Self {
        Self::new(&config.discovery.extensions, config.discovery.recursive).excluding(config.output_dir())
    }

    /// Skip a subtree, typically the output root when it lives inside the input root.
    pub fn excluding(mut self, dir: impl AsRef<Path>) -> Self {
        self.exclude = fs::canonicalize(dir.as_ref()).ok();
        self
    }

    pub fn scan(&self, root: &Path) -> Result<Discovered> {
        if !root.exists() {
            return Err(Error::InputMissing(root.to_path_buf()));
        }
        if !root.is_dir() {
            return Err(Error::NotADirectory(root.to_path_buf()));
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let walker = WalkDir::new(root)
            .follow_links(false)
            .max_depth(max_depth)
            .into_iter()
            .filter_entry(|e| !self.is_excluded(e));

        let mut found = Discovered::default();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    continue;
                }
            };
            let file_type = entry.file_type();
            if file_type.is_dir() || !self.has_known_extension(entry.path()) {
                continue;
            }
            if file_type.is_file() {
                found.files.push(entry.into_path());
            } else {
                let reason = if file_type.is_symlink() {
                    "not a regular file (symbolic link, not followed)"
                } else {
                    "not a regular file"
                };
                found.rejected.push((entry.into_path(), reason.to_string()));
            }
        }
        found.files.sort();
        found.rejected.sort();
        tracing::debug!(
            root = %root.display(),
            files = found.files.len(),
            rejected = found.rejected.len(),
            "discovery complete"
        );
        Ok(found)
    }

    fn has_known_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        let Some(exclude) = &self.exclude else { return false };
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        fs::canonicalize(entry.path()).map(|p| &p == exclude).unwrap_or(false)
    }
}
