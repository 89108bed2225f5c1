//! The four per-run outcome logs.
//!
//! Each line is `<RFC 3339 UTC timestamp>\t<source path>\t<detail>`. Every
//! document lands in exactly one log; `tracing` mirrors the line to the console.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use pdfsort_core::error::{Error, Result};
use pdfsort_core::types::{DocumentRecord, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogKind {
    Process,
    Error,
    Duplicate,
    Unreadable,
}

impl LogKind {
    pub const ALL: [LogKind; 4] = [LogKind::Process, LogKind::Error, LogKind::Duplicate, LogKind::Unreadable];

    pub fn file_name(self) -> &'static str {
        match self {
            LogKind::Process => "process.log",
            LogKind::Error => "errors.log",
            LogKind::Duplicate => "duplicates.log",
            LogKind::Unreadable => "unreadable.log",
        }
    }
}

struct LogFile {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl LogFile {
    fn open(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| Error::OutputNotWritable { path: path.clone(), source })?;
        Ok(Self { path, writer: Mutex::new(BufWriter::new(file)) })
    }

    fn write_line(&self, line: &str) -> Result<()> {
        let mut w = self
            .writer
            .lock()
            .map_err(|_| Error::Operation(format!("{} lock poisoned", self.path.display())))?;
        writeln!(w, "{line}")?;
        w.flush()?;
        Ok(())
    }
}

pub struct RunLogs {
    process: LogFile,
    errors: LogFile,
    duplicates: LogFile,
    unreadable: LogFile,
}

impl RunLogs {
    /// Create `dir` if needed and open all four logs for appending.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| Error::OutputNotWritable { path: dir.clone(), source })?;
        Ok(Self {
            process: LogFile::open(dir.join(LogKind::Process.file_name()))?,
            errors: LogFile::open(dir.join(LogKind::Error.file_name()))?,
            duplicates: LogFile::open(dir.join(LogKind::Duplicate.file_name()))?,
            unreadable: LogFile::open(dir.join(LogKind::Unreadable.file_name()))?,
        })
    }

    pub fn path(&self, kind: LogKind) -> &Path {
        &self.file(kind).path
    }

    fn file(&self, kind: LogKind) -> &LogFile {
        match kind {
            LogKind::Process => &self.process,
            LogKind::Error => &self.errors,
            LogKind::Duplicate => &self.duplicates,
            LogKind::Unreadable => &self.unreadable,
        }
    }

    pub fn record(&self, kind: LogKind, source: &Path, detail: &str) -> Result<()> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let detail = detail.replace(['\n', '\r'], " ");
        self.file(kind).write_line(&format!("{timestamp}\t{}\t{detail}", source.display()))
    }

    /// Route a settled document to its log. Pending documents are rejected.
    pub fn record_outcome(&self, doc: &DocumentRecord) -> Result<()> {
        let source = doc.source.as_path();
        match doc.outcome() {
            Outcome::Pending => Err(Error::Operation(format!("{} has no outcome yet", source.display()))),
            Outcome::Sorted { destination } => {
                tracing::info!(source = %source.display(), language = %doc.language, topic = %doc.topic, "sorted");
                let detail = format!("sorted -> {} (language={}, topic={})", destination.display(), doc.language, doc.topic);
                self.record(LogKind::Process, source, &detail)
            }
            Outcome::Duplicate { original } => {
                tracing::warn!(source = %source.display(), original = %original.display(), "duplicate");
                self.record(LogKind::Duplicate, source, &format!("duplicate of {}", original.display()))
            }
            Outcome::Unreadable { reason } => {
                tracing::warn!(source = %source.display(), "unreadable: {}", reason);
                self.record(LogKind::Unreadable, source, &format!("unreadable: {reason}"))
            }
            Outcome::Error { reason } => {
                tracing::error!(source = %source.display(), "error: {}", reason);
                self.record(LogKind::Error, source, &format!("error: {reason}"))
            }
        }
    }
}
