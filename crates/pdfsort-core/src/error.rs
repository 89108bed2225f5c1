use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Input directory does not exist: {0}")]
    InputMissing(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Output location is not writable: {path}: {source}")]
    OutputNotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unreadable document {path}: {reason}")]
    UnreadableDocument { path: PathBuf, reason: String },

    #[error("Operation failed: {0}")]
    Operation(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn unreadable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::UnreadableDocument { path: path.into(), reason: reason.to_string() }
    }

    /// Setup errors abort the run; everything else is scoped to one document.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig(_) | Self::InputMissing(_) | Self::NotADirectory(_) | Self::OutputNotWritable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
