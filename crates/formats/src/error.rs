//! Error types for dataset loading and writing

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Format layer errors
#[derive(Error, Debug)]
pub enum Error {
    /// The file is missing, unreadable or locked by another process
    #[error("cannot open {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a usable tabular document
    #[error("{} is not a valid spreadsheet: {reason}", path.display())]
    FileFormat { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    pub(crate) fn access(path: &Path, source: std::io::Error) -> Self {
        Error::FileAccess {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn format(path: &Path, reason: impl Into<String>) -> Self {
        Error::FileFormat {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for format operations
pub type Result<T> = std::result::Result<T, Error>;
