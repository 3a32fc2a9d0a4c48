//! Progress reporting and result tables for the CLI

use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;
use sheetdedup_core::{FileOutcome, FileReport};
use sheetdedup_formats::DatasetShape;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// File-level progress bar for a batch run
pub struct BatchProgress {
    bar: ProgressBar,
    duplicates: AtomicUsize,
    failures: AtomicUsize,
}

impl BatchProgress {
    /// Create a bar over `total_files`; `hidden` suppresses drawing (JSON mode)
    pub fn new(total_files: usize, hidden: bool) -> Result<Self> {
        let bar = ProgressBar::new(total_files as u64);
        if hidden {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
                .progress_chars("█▓▒░-"),
        );

        Ok(Self {
            bar,
            duplicates: AtomicUsize::new(0),
            failures: AtomicUsize::new(0),
        })
    }

    /// Account for one finished (or skipped) file
    pub fn record(&self, report: &FileReport) {
        match &report.outcome {
            FileOutcome::Processed(summary) => {
                self.duplicates
                    .fetch_add(summary.duplicate_row_count, Ordering::Relaxed);
            }
            FileOutcome::Failed { .. } => {
                self.failures.fetch_add(1, Ordering::Relaxed);
            }
            FileOutcome::Cancelled => {}
        }

        self.bar.set_message(Self::stats_message(
            self.duplicates.load(Ordering::Relaxed),
            self.failures.load(Ordering::Relaxed),
        ));
        self.bar.inc(1);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Complete!");
    }

    fn stats_message(duplicates: usize, failures: usize) -> String {
        if failures > 0 {
            format!(
                "| {} duplicates | {} failed",
                format_number(duplicates),
                failures
            )
        } else {
            format!("| {} duplicates", format_number(duplicates))
        }
    }
}

/// Totals over all reports of a batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchTotals {
    pub files: usize,
    pub processed: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub files_with_duplicates: usize,
    pub total_rows: usize,
    pub unique_rows: usize,
    pub duplicate_rows: usize,
}

impl BatchTotals {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut totals = Self {
            files: reports.len(),
            ..Default::default()
        };

        for report in reports {
            match &report.outcome {
                FileOutcome::Processed(summary) => {
                    totals.processed += 1;
                    totals.total_rows += summary.total_rows;
                    totals.unique_rows += summary.unique_row_count;
                    totals.duplicate_rows += summary.duplicate_row_count;
                    if summary.has_duplicates {
                        totals.files_with_duplicates += 1;
                    }
                }
                FileOutcome::Failed { .. } => totals.failed += 1,
                FileOutcome::Cancelled => totals.cancelled += 1,
            }
        }

        totals
    }

    /// Duplicate share of all data rows, in percent
    pub fn duplicate_rate(&self) -> f64 {
        let data_rows = self.unique_rows + self.duplicate_rows;
        if data_rows == 0 {
            0.0
        } else {
            (self.duplicate_rows as f64 / data_rows as f64) * 100.0
        }
    }

    /// True when every file was processed
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0 && self.cancelled == 0
    }
}

/// Print one line per file: duplicate flag, counts, or the failure cause
pub fn print_file_table(reports: &[FileReport]) {
    println!(
        "{:<40} {:>6} {:>10} {:>6} {:>12} {:>7}",
        "File", "Dups?", "Rows", "Cols", "Duplicates", "Rate"
    );
    println!("{}", "─".repeat(86));

    for report in reports {
        let name = display_name(&report.path);
        match &report.outcome {
            FileOutcome::Processed(summary) => println!(
                "{:<40} {:>6} {:>10} {:>6} {:>12} {:>6.1}%",
                name,
                if summary.has_duplicates { "yes" } else { "no" },
                format_with_commas(summary.total_rows),
                summary.total_cols,
                format_with_commas(summary.duplicate_row_count),
                summary.duplicate_rate
            ),
            FileOutcome::Failed { kind, message } => {
                println!("{:<40} failed ({:?}): {}", name, kind, message)
            }
            FileOutcome::Cancelled => println!("{:<40} cancelled", name),
        }
    }
}

/// Print a formatted summary report
pub fn print_summary_report(totals: &BatchTotals, output_dir: Option<&Path>, dry_run: bool) {
    println!("\n{}", "═".repeat(60));
    println!("Spreadsheet Deduplication Complete");
    println!("{}", "═".repeat(60));
    println!("Files:              {}", format_with_commas(totals.files));
    println!("Processed:          {}", format_with_commas(totals.processed));

    if totals.failed > 0 {
        println!("Failed:             {}", format_with_commas(totals.failed));
    }
    if totals.cancelled > 0 {
        println!("Cancelled:          {}", format_with_commas(totals.cancelled));
    }

    println!(
        "Files with dups:    {}",
        format_with_commas(totals.files_with_duplicates)
    );
    println!("Total rows:         {}", format_with_commas(totals.total_rows));

    if totals.processed > 0 {
        println!(
            "Duplicate rows:     {} ({:.1}%)",
            format_with_commas(totals.duplicate_rows),
            totals.duplicate_rate()
        );
    }

    if dry_run {
        println!("Output:             (dry run - no output written)");
    } else if let Some(dir) = output_dir {
        println!("Output:             {}", dir.display());
    } else {
        println!("Output:             deduplicated/ next to each input");
    }

    println!("{}", "═".repeat(60));
}

/// Shape of one inspected file, or why it could not be read
#[derive(Debug, Clone, Serialize)]
pub struct InspectRow {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<DatasetShape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Widest column count among readable files
pub fn max_columns(rows: &[InspectRow]) -> usize {
    rows.iter()
        .filter_map(|row| row.shape.map(|shape| shape.columns))
        .max()
        .unwrap_or(0)
}

pub fn print_inspect_table(rows: &[InspectRow]) {
    println!("{:<40} {:>10} {:>6}", "File", "Rows", "Cols");
    println!("{}", "─".repeat(58));

    for row in rows {
        let name = display_name(&row.path);
        match (&row.shape, &row.error) {
            (Some(shape), _) => println!(
                "{:<40} {:>10} {:>6}",
                name,
                format_with_commas(shape.rows),
                shape.columns
            ),
            (None, Some(error)) => println!("{:<40} error: {}", name, error),
            (None, None) => println!("{:<40} -", name),
        }
    }

    println!("\nMax columns: {}", max_columns(rows));
}

fn display_name(path: &Path) -> String {
    path.display().to_string()
}

/// Format large numbers compactly
fn format_number(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Format number with thousand separators
fn format_with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
