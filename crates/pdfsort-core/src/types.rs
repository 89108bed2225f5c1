//! Domain types that flow through the sorting pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const UNKNOWN_LANGUAGE: &str = "unknown";
pub const UNCLASSIFIED_TOPIC: &str = "unclassified";

/// Final state of a document. `Pending` until the pipeline settles it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Pending,
    Sorted { destination: PathBuf },
    Duplicate { original: PathBuf },
    Unreadable { reason: String },
    Error { reason: String },
}

/// Discriminant of a settled [`Outcome`], used for counting and log routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Sorted,
    Duplicate,
    Unreadable,
    Error,
}

impl Outcome {
    pub fn kind(&self) -> Option<OutcomeKind> {
        match self {
            Outcome::Pending => None,
            Outcome::Sorted { .. } => Some(OutcomeKind::Sorted),
            Outcome::Duplicate { .. } => Some(OutcomeKind::Duplicate),
            Outcome::Unreadable { .. } => Some(OutcomeKind::Unreadable),
            Outcome::Error { .. } => Some(OutcomeKind::Error),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending)
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutcomeKind::Sorted => "sorted",
            OutcomeKind::Duplicate => "duplicate",
            OutcomeKind::Unreadable => "unreadable",
            OutcomeKind::Error => "error",
        };
        f.write_str(s)
    }
}

/// One record per discovered file.
///
/// - `source`: path as discovered
/// - `byte_len`: raw size on disk (0 when the file could not be read)
/// - `text`: extracted plain text, possibly empty
/// - `hash`: hex SHA-256 of the raw bytes
/// - `language`/`topic`: classification results, `unknown`/`unclassified` until set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub source: PathBuf,
    pub byte_len: u64,
    pub text: String,
    pub hash: Option<String>,
    pub language: String,
    pub topic: String,
    outcome: Outcome,
}

impl DocumentRecord {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            byte_len: 0,
            text: String::new(),
            hash: None,
            language: UNKNOWN_LANGUAGE.to_string(),
            topic: UNCLASSIFIED_TOPIC.to_string(),
            outcome: Outcome::Pending,
        }
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// Assign the final outcome. A record settles exactly once.
    pub fn settle(&mut self, outcome: Outcome) -> Result<()> {
        if outcome.is_pending() {
            return Err(Error::Operation(format!("cannot settle {} back to pending", self.source.display())));
        }
        if !self.outcome.is_pending() {
            return Err(Error::Operation(format!(
                "outcome for {} already settled as {:?}",
                self.source.display(),
                self.outcome.kind()
            )));
        }
        self.outcome = outcome;
        Ok(())
    }

    pub fn file_name(&self) -> String {
        file_name_of(&self.source)
    }

    pub fn destination(&self) -> Option<&Path> {
        match &self.outcome {
            Outcome::Sorted { destination } => Some(destination),
            _ => None,
        }
    }
}

/// One line of the index: where a sorted document ended up and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub path: PathBuf,
    pub language: String,
    pub topic: String,
    pub file_name: String,
}

impl IndexEntry {
    /// Tab-separated: destination, language, topic, original filename.
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}",
            self.path.display(),
            clean_field(&self.language),
            clean_field(&self.topic),
            clean_field(&self.file_name)
        )
    }

    pub fn parse_line(line: &str) -> Option<Self> {
        let mut parts = line.splitn(4, '\t');
        let path = parts.next().filter(|p| !p.is_empty())?;
        let language = parts.next()?;
        let topic = parts.next()?;
        let file_name = parts.next()?;
        Some(Self {
            path: PathBuf::from(path),
            language: language.to_string(),
            topic: topic.to_string(),
            file_name: file_name.to_string(),
        })
    }
}

fn clean_field(s: &str) -> String {
    s.replace(['\t', '\n', '\r'], " ")
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default()
}
