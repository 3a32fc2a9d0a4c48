//! CSV dataset reader
//!
//! Every record becomes a row, the first one included; header handling
//! is left to the deduplication layer.

use crate::{Cell, Dataset, Error, Result, Row};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Configuration for the CSV reader
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Field delimiter
    pub delimiter: u8,
    /// Buffer size for the underlying reader
    pub buffer_size: usize,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            buffer_size: 64 * 1024, // 64KB buffer
        }
    }
}

/// Load a CSV file into a dataset
pub fn read_csv(path: &Path) -> Result<Dataset> {
    let file = File::open(path).map_err(|e| Error::access(path, e))?;
    debug!("Reading CSV file: {:?}", path);

    read_csv_from(file, &CsvConfig::default())
        .map_err(|e| Error::format(path, e.to_string()))
}

/// Parse CSV data from any `Read` source.
///
/// Records may have differing lengths; shorter rows are padded later
/// through the dataset's column count.
pub fn read_csv_from<R: Read>(reader: R, config: &CsvConfig) -> std::result::Result<Dataset, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(config.delimiter)
        .buffer_capacity(config.buffer_size)
        .from_reader(reader);

    let mut rows: Vec<Row> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }

    Ok(Dataset::from_rows(rows))
}
