//! Core deduplication logic for spreadsheet rows
//!
//! This crate decides which rows of a dataset repeat an earlier row's
//! key columns, and runs that decision over batches of files.

pub mod classifier;
pub mod dedup;
pub mod error;
pub mod key;
pub mod pipeline;

pub use classifier::{classify, classify_with_stats, DedupStats, DuplicateClassifier, RowVerdict};
pub use dedup::{deduplicate, DedupResult};
pub use error::{Error, ErrorKind, Result};
pub use key::{KeySpec, KeyTuple, KeyValue, NormalizeOptions, MAX_KEY_COLUMN};
pub use pipeline::{
    process_file, BatchOptions, BatchPipeline, BatchPipelineBuilder, CancellationToken,
    FileOutcome, FileReport, FileSummary, DEFAULT_JOBS,
};
