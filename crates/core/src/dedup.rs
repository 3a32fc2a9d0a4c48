//! Deduplication of a whole dataset

use crate::classifier::{classify_with_stats, DedupStats, RowVerdict};
use crate::key::{KeySpec, NormalizeOptions};
use crate::Result;
use ahash::AHashSet;
use sheetdedup_formats::{Dataset, Row};
use std::hash::Hash;
use tracing::debug;

/// Tracks keys seen so far; the first occurrence of a key wins
pub struct DedupTracker<K> {
    seen: AHashSet<K>,
}

impl<K: Hash + Eq> DedupTracker<K> {
    /// Create a new deduplication tracker
    pub fn new() -> Self {
        Self {
            seen: AHashSet::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            seen: AHashSet::with_capacity(capacity),
        }
    }

    /// Record `key`; returns true if it had been seen before
    pub fn is_duplicate(&mut self, key: K) -> bool {
        !self.seen.insert(key)
    }
}

impl<K: Hash + Eq> Default for DedupTracker<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of deduplicating one dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DedupResult {
    /// Rows in the dataset, header included
    pub total_rows: usize,
    pub total_cols: usize,
    /// One verdict per data row
    pub verdicts: Vec<RowVerdict>,
    /// Header followed by first-occurrence rows, in original order
    pub unique_rows: Vec<Row>,
    /// Header followed by duplicate rows, in original order
    pub duplicate_rows: Vec<Row>,
    /// Counts from the classification pass
    pub stats: DedupStats,
}

impl DedupResult {
    pub fn duplicate_row_count(&self) -> usize {
        self.stats.duplicates_found
    }

    /// Number of unique data rows (header excluded)
    pub fn unique_row_count(&self) -> usize {
        self.stats.unique_count
    }

    pub fn has_duplicates(&self) -> bool {
        self.stats.duplicates_found > 0
    }
}

/// Split a dataset into first-occurrence rows and duplicates.
///
/// Row 1 is the header: it is never compared and starts both partitions.
/// An empty `key_spec` performs no deduplication. Fails with
/// `Error::InvalidKeySpec` when a key column lies beyond the dataset's
/// column count.
pub fn deduplicate(
    dataset: Dataset,
    key_spec: &KeySpec,
    options: &NormalizeOptions,
) -> Result<DedupResult> {
    let total_rows = dataset.row_count();
    let total_cols = dataset.column_count();
    key_spec.validate_for(total_cols)?;

    let (verdicts, stats) = classify_with_stats(dataset.data_rows(), key_spec, options);

    let mut rows = dataset.into_rows().into_iter();
    let mut unique_rows = Vec::with_capacity(total_rows);
    let mut duplicate_rows = Vec::new();
    if let Some(header) = rows.next() {
        duplicate_rows.push(header.clone());
        unique_rows.push(header);
    }

    for (row, verdict) in rows.zip(&verdicts) {
        match verdict {
            RowVerdict::Unique => unique_rows.push(row),
            RowVerdict::Duplicate => duplicate_rows.push(row),
        }
    }

    debug!(
        "Deduplicated {} rows on columns [{}]: {} duplicates",
        total_rows,
        key_spec,
        stats.duplicates_found
    );

    Ok(DedupResult {
        total_rows,
        total_cols,
        verdicts,
        unique_rows,
        duplicate_rows,
        stats,
    })
}
