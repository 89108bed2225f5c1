use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use pdfsort_core::error::{Error, Result};
use pdfsort_core::types::IndexEntry;

/// Append-only index: one tab-separated line per sorted document.
pub struct IndexWriter {
    path: PathBuf,
    file: Mutex<BufWriter<File>>,
}

impl IndexWriter {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| Error::OutputNotWritable { path: parent.to_path_buf(), source })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| Error::OutputNotWritable { path: path.clone(), source })?;
        Ok(Self { path, file: Mutex::new(BufWriter::new(file)) })
    }

    /// Written through immediately so an interrupted run keeps what it sorted.
    pub fn append(&self, entry: &IndexEntry) -> Result<()> {
        let mut file = self.file.lock().map_err(|_| Error::Operation(format!("{} lock poisoned", self.path.display())))?;
        writeln!(file, "{}", entry.to_line())?;
        file.flush()?;
        Ok(())
    }
}

pub fn read_index(path: &Path) -> Result<Vec<IndexEntry>> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match IndexEntry::parse_line(&line) {
            Some(entry) => entries.push(entry),
            None => tracing::warn!(index = %path.display(), "skipping malformed index line: {}", line),
        }
    }
    Ok(entries)
}
