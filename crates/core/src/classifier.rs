//! Duplicate classification
//!
//! Walks data rows once, keeping the exact set of comparison keys seen so
//! far. A row whose key is already in the set is a duplicate; otherwise
//! it is unique and its key is recorded. Keys are stored whole rather
//! than hashed down, so distinct keys can never collide.

use crate::dedup::DedupTracker;
use crate::key::{KeySpec, KeyTuple, NormalizeOptions};
use serde::Serialize;
use sheetdedup_formats::Cell;
use tracing::debug;

/// Verdict for one data row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowVerdict {
    Unique,
    Duplicate,
}

/// Statistics for deduplication operations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    /// Total number of rows seen
    pub total_seen: usize,
    /// Number of duplicates found
    pub duplicates_found: usize,
    /// Number of unique rows
    pub unique_count: usize,
}

impl DedupStats {
    /// Get the deduplication rate as a percentage
    pub fn dedup_rate(&self) -> f64 {
        if self.total_seen == 0 {
            0.0
        } else {
            (self.duplicates_found as f64 / self.total_seen as f64) * 100.0
        }
    }
}

/// Stateful first-wins classifier over a stream of rows
pub struct DuplicateClassifier {
    key_spec: KeySpec,
    options: NormalizeOptions,
    seen: DedupTracker<KeyTuple>,
    stats: DedupStats,
}

impl DuplicateClassifier {
    pub fn new(key_spec: KeySpec, options: NormalizeOptions) -> Self {
        Self::with_capacity(key_spec, options, 0)
    }

    /// Create a classifier sized for roughly `capacity` distinct keys
    pub fn with_capacity(key_spec: KeySpec, options: NormalizeOptions, capacity: usize) -> Self {
        debug!(
            "Creating DuplicateClassifier on columns [{}] (case_sensitive: {})",
            key_spec, options.case_sensitive
        );

        Self {
            key_spec,
            options,
            seen: DedupTracker::with_capacity(capacity),
            stats: DedupStats::default(),
        }
    }

    /// Check if a row is a duplicate of an earlier one
    ///
    /// Returns `true` if this is a duplicate, `false` if unique. With an
    /// empty key spec every row is unique.
    pub fn is_duplicate(&mut self, row: &[Cell]) -> bool {
        self.stats.total_seen += 1;

        if self.key_spec.is_empty() {
            self.stats.unique_count += 1;
            return false;
        }

        let key = self.key_spec.extract(row, &self.options);
        if self.seen.is_duplicate(key) {
            self.stats.duplicates_found += 1;
            true
        } else {
            self.stats.unique_count += 1;
            false
        }
    }

    pub fn verdict(&mut self, row: &[Cell]) -> RowVerdict {
        if self.is_duplicate(row) {
            RowVerdict::Duplicate
        } else {
            RowVerdict::Unique
        }
    }

    /// Get current statistics
    pub fn stats(&self) -> &DedupStats {
        &self.stats
    }

    pub fn into_stats(self) -> DedupStats {
        self.stats
    }
}

/// Classify `rows` (header excluded) in one pass
pub fn classify<R: AsRef<[Cell]>>(
    rows: &[R],
    key_spec: &KeySpec,
    options: &NormalizeOptions,
) -> Vec<RowVerdict> {
    classify_with_stats(rows, key_spec, options).0
}

/// Like `classify`, also returning the pass statistics
pub fn classify_with_stats<R: AsRef<[Cell]>>(
    rows: &[R],
    key_spec: &KeySpec,
    options: &NormalizeOptions,
) -> (Vec<RowVerdict>, DedupStats) {
    let mut classifier = DuplicateClassifier::with_capacity(key_spec.clone(), *options, rows.len());
    let verdicts = rows.iter().map(|row| classifier.verdict(row.as_ref())).collect();
    (verdicts, classifier.into_stats())
}
