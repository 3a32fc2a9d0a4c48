//! Batch processing pipeline
//!
//! Runs load → classify → write for every input file on a bounded Rayon
//! thread pool. Files are independent: a failure is recorded in that
//! file's report and the rest of the batch carries on.

use crate::dedup::deduplicate;
use crate::error::{Error, ErrorKind, Result};
use crate::key::{KeySpec, NormalizeOptions};
use rayon::prelude::*;
use serde::Serialize;
use sheetdedup_formats::{open_dataset, write_results, OutputLayout};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Worker count used when none is configured
pub const DEFAULT_JOBS: usize = 4;

/// Cooperative cancellation flag shared between a batch and its caller.
///
/// Checked before each file starts; a file already in progress runs to
/// completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Counts and artifacts for a successfully processed file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub total_rows: usize,
    pub total_cols: usize,
    pub has_duplicates: bool,
    pub duplicate_row_count: usize,
    /// Data rows kept, header excluded
    pub unique_row_count: usize,
    /// Duplicate share of the data rows, in percent
    pub duplicate_rate: f64,
    /// None on dry runs
    pub unique_output: Option<PathBuf>,
    /// None on dry runs and when there are no duplicates
    pub duplicate_output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Processed(FileSummary),
    Failed { kind: ErrorKind, message: String },
    Cancelled,
}

/// Per-file result handed back to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

impl FileReport {
    fn failed(path: &Path, error: &Error) -> Self {
        Self {
            path: path.to_path_buf(),
            outcome: FileOutcome::Failed {
                kind: error.kind(),
                message: error.to_string(),
            },
        }
    }

    fn cancelled(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            outcome: FileOutcome::Cancelled,
        }
    }

    pub fn summary(&self) -> Option<&FileSummary> {
        match &self.outcome {
            FileOutcome::Processed(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.summary().is_some()
    }
}

/// Settings shared read-only by every file of a batch
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub key_spec: KeySpec,
    pub normalize: NormalizeOptions,
    pub layout: OutputLayout,
    /// Number of files processed concurrently
    pub jobs: usize,
    /// Refuse to start when no key column is selected
    pub require_key: bool,
    /// Write result files (false = dry run)
    pub write_outputs: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            key_spec: KeySpec::empty(),
            normalize: NormalizeOptions::default(),
            layout: OutputLayout::default(),
            jobs: DEFAULT_JOBS,
            require_key: false,
            write_outputs: true,
        }
    }
}

/// Deduplicate a single file, converting any error into a failed report
pub fn process_file(path: &Path, options: &BatchOptions) -> FileReport {
    match try_process_file(path, options) {
        Ok(summary) => {
            info!(
                "Processed {:?}: {} rows, {} duplicates",
                path, summary.total_rows, summary.duplicate_row_count
            );
            FileReport {
                path: path.to_path_buf(),
                outcome: FileOutcome::Processed(summary),
            }
        }
        Err(e) => {
            warn!("Failed to process {:?}: {}", path, e);
            FileReport::failed(path, &e)
        }
    }
}

fn try_process_file(path: &Path, options: &BatchOptions) -> Result<FileSummary> {
    let dataset = open_dataset(path)?;
    let result = deduplicate(dataset, &options.key_spec, &options.normalize)?;

    let has_duplicates = result.has_duplicates();
    let (unique_output, duplicate_output) = if options.write_outputs {
        let duplicates = has_duplicates.then_some(result.duplicate_rows.as_slice());
        let written = write_results(
            path,
            &options.layout,
            result.total_cols,
            &result.unique_rows,
            duplicates,
        )?;
        (Some(written.unique), written.duplicates)
    } else {
        (None, None)
    };

    Ok(FileSummary {
        total_rows: result.total_rows,
        total_cols: result.total_cols,
        has_duplicates,
        duplicate_row_count: result.duplicate_row_count(),
        unique_row_count: result.unique_row_count(),
        duplicate_rate: result.stats.dedup_rate(),
        unique_output,
        duplicate_output,
    })
}

/// Deduplication pipeline over a batch of files
pub struct BatchPipeline {
    options: BatchOptions,
    pool: rayon::ThreadPool,
    cancel: CancellationToken,
}

impl BatchPipeline {
    /// Create a new pipeline with the given options
    pub fn new(options: BatchOptions) -> Result<Self> {
        Self::with_cancellation(options, CancellationToken::new())
    }

    pub fn with_cancellation(options: BatchOptions, cancel: CancellationToken) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs.max(1))
            .thread_name(|i| format!("sheetdedup-worker-{}", i))
            .build()?;

        Ok(Self {
            options,
            pool,
            cancel,
        })
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Token that stops the batch before its next file when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Batch-level checks, reported once before any file is touched
    pub fn check_preconditions(&self, inputs: &[PathBuf]) -> Result<()> {
        if inputs.is_empty() {
            return Err(Error::InvalidKeySpec("no input files given".to_string()));
        }
        if self.options.require_key && self.options.key_spec.is_empty() {
            return Err(Error::InvalidKeySpec("no key columns selected".to_string()));
        }
        if self.options.write_outputs {
            self.check_output_paths(inputs)?;
        }
        Ok(())
    }

    /// Every result file must belong to exactly one input
    fn check_output_paths(&self, inputs: &[PathBuf]) -> Result<()> {
        let layout = &self.options.layout;
        let mut owners: HashMap<PathBuf, &PathBuf> = HashMap::with_capacity(inputs.len() * 2);

        for input in inputs {
            for artifact in [layout.unique_path(input), layout.duplicate_path(input)] {
                if let Some(first) = owners.insert(artifact.clone(), input) {
                    return Err(Error::OutputConflict {
                        path: artifact,
                        first: first.clone(),
                        second: input.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Process every input and return one report per input, in input order
    pub fn run(&self, inputs: &[PathBuf]) -> Result<Vec<FileReport>> {
        self.run_with_progress(inputs, |_| {})
    }

    /// Like `run`, calling `on_report` as each file finishes
    pub fn run_with_progress<F>(&self, inputs: &[PathBuf], on_report: F) -> Result<Vec<FileReport>>
    where
        F: Fn(&FileReport) + Sync,
    {
        self.check_preconditions(inputs)?;

        info!(
            "Processing {} files on columns [{}] with {} workers",
            inputs.len(),
            self.options.key_spec,
            self.pool.current_num_threads()
        );

        let reports = self.pool.install(|| {
            inputs
                .par_iter()
                .map(|path| {
                    let report = if self.cancel.is_cancelled() {
                        FileReport::cancelled(path)
                    } else {
                        process_file(path, &self.options)
                    };
                    on_report(&report);
                    report
                })
                .collect()
        });

        Ok(reports)
    }
}

/// Builder for batch pipelines
pub struct BatchPipelineBuilder {
    options: BatchOptions,
    cancel: CancellationToken,
}

impl BatchPipelineBuilder {
    pub fn new() -> Self {
        Self {
            options: BatchOptions::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn key_spec(mut self, key_spec: KeySpec) -> Self {
        self.options.key_spec = key_spec;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.options.normalize.case_sensitive = case_sensitive;
        self
    }

    pub fn layout(mut self, layout: OutputLayout) -> Self {
        self.options.layout = layout;
        self
    }

    pub fn jobs(mut self, jobs: usize) -> Self {
        self.options.jobs = jobs;
        self
    }

    pub fn require_key(mut self, require_key: bool) -> Self {
        self.options.require_key = require_key;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.options.write_outputs = !dry_run;
        self
    }

    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn build(self) -> Result<BatchPipeline> {
        BatchPipeline::with_cancellation(self.options, self.cancel)
    }
}

impl Default for BatchPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
