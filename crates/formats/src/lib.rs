//! Spreadsheet loading and result writing for row deduplication
//!
//! This crate turns spreadsheet and CSV files into in-memory datasets
//! and writes partitioned row sets back to disk atomically.

pub mod csv_reader;
pub mod dataset;
pub mod discovery;
pub mod error;
pub mod reader;
pub mod workbook;
pub mod writer;

pub use dataset::{Cell, Dataset, DatasetShape, Row};
pub use discovery::discover_inputs;
pub use error::{Error, Result};
pub use reader::{inspect, is_supported, open_dataset, InputFormat};
pub use writer::{write_results, OutputLayout, WrittenArtifacts};
