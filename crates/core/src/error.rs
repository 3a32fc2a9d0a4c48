//! Error types for the core deduplication engine

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Core deduplication errors
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] sheetdedup_formats::Error),

    #[error("Invalid key columns: {0}")]
    InvalidKeySpec(String),

    #[error(
        "{} and {} would both write {}",
        first.display(),
        second.display(),
        path.display()
    )]
    OutputConflict {
        path: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Coarse error classification reported per file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing, unreadable or locked input
    FileAccess,
    /// Input is not a valid or non-empty tabular document
    FileFormat,
    /// Key columns do not fit the input
    InvalidKeySpec,
    /// Results could not be written
    Output,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use sheetdedup_formats::Error as FormatError;

        match self {
            Error::Format(FormatError::FileAccess { .. }) => ErrorKind::FileAccess,
            Error::Format(FormatError::FileFormat { .. }) => ErrorKind::FileFormat,
            Error::Format(FormatError::Io(_) | FormatError::Csv(_)) => ErrorKind::Output,
            Error::InvalidKeySpec(_) => ErrorKind::InvalidKeySpec,
            Error::OutputConflict { .. } => ErrorKind::Output,
            Error::ThreadPool(_) => ErrorKind::Internal,
        }
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
