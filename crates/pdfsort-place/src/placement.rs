use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use pdfsort_core::config::PlacementConfig;
use pdfsort_core::error::{Error, Result};

/// Make a label safe as a single path component.
///
/// Spaces and path separators become `_`, the result is cut to `max_len`
/// characters, and empty or dot-only names become `_`.
pub fn sanitize_component(raw: &str, max_len: usize) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .take(max_len.max(1))
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

#[derive(Debug, Clone)]
pub struct Placer {
    output_root: PathBuf,
    keep_originals: bool,
    max_topic_len: usize,
}

impl Placer {
    pub fn new(output_root: impl Into<PathBuf>, config: &PlacementConfig) -> Self {
        Self {
            output_root: output_root.into(),
            keep_originals: config.keep_originals,
            max_topic_len: config.max_topic_len,
        }
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn destination_dir(&self, language: &str, topic: &str) -> PathBuf {
        self.output_root
            .join(sanitize_component(language, usize::MAX))
            .join(sanitize_component(topic, self.max_topic_len))
    }

    /// Move (or copy, with `keep_originals`) `source` into `<root>/<language>/<topic>/`.
    ///
    /// Never overwrites: a taken name gets `_1`, `_2`, ... before the extension.
    pub fn place(&self, source: &Path, language: &str, topic: &str) -> Result<PathBuf> {
        let file_name = source
            .file_name()
            .ok_or_else(|| Error::Operation(format!("{} has no file name", source.display())))?;
        let dir = self.destination_dir(language, topic);
        fs::create_dir_all(&dir)?;

        let destination = free_path(&dir, Path::new(file_name));
        if self.keep_originals {
            fs::copy(source, &destination)?;
        } else {
            move_file(source, &destination)?;
        }
        tracing::debug!(from = %source.display(), to = %destination.display(), "placed");
        Ok(destination)
    }
}

fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn free_path(dir: &Path, file_name: &Path) -> PathBuf {
    let first = dir.join(file_name);
    if !exists(&first) {
        return first;
    }
    let stem = file_name.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
    let ext = file_name.extension().map(|e| e.to_string_lossy().to_string());
    (1u64..)
        .map(|n| match &ext {
            Some(ext) => dir.join(format!("{stem}_{n}.{ext}")),
            None => dir.join(format!("{stem}_{n}")),
        })
        .find(|candidate| !exists(candidate))
        .unwrap_or(first)
}

/// Rename, falling back to copy + remove when the rename crosses filesystems.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            tracing::debug!("rename failed ({}), copying instead", rename_err);
            copy_then_remove(source, destination, |path| fs::remove_file(path))
        }
    }
}

/// Copy, then delete the source. If the source cannot be deleted the copy is
/// removed again, so a failed move leaves the file only where it started.
fn copy_then_remove<F>(source: &Path, destination: &Path, remove_source: F) -> io::Result<()>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    if let Err(copy_err) = fs::copy(source, destination) {
        let _ = fs::remove_file(destination);
        return Err(copy_err);
    }
    if let Err(remove_err) = remove_source(source) {
        if let Err(cleanup) = fs::remove_file(destination) {
            tracing::warn!("could not roll back copy at {}: {}", destination.display(), cleanup);
        }
        return Err(remove_err);
    }
    Ok(())
}
