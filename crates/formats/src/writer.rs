//! Result writer
//!
//! Writes the unique and duplicate row sets of one input file as CSV.
//! Each artifact is written to a temporary file in the destination
//! directory and renamed into place only once it is complete, so an
//! interrupted run never leaves a partial output behind.

use crate::{Cell, Result, Row};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Directory created next to each input when no output directory is set
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "deduplicated";

/// Where and under which names result files are written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputLayout {
    /// Shared results directory (None = `deduplicated/` next to each input)
    pub output_dir: Option<PathBuf>,
    /// Appended to the input's file stem for the unique-rows file
    pub unique_suffix: String,
    /// Appended to the input's file stem for the duplicate-rows file
    pub duplicate_suffix: String,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            output_dir: None,
            unique_suffix: "_unique".to_string(),
            duplicate_suffix: "_duplicates".to_string(),
        }
    }
}

impl OutputLayout {
    /// Directory receiving the artifacts for `input`
    pub fn directory_for(&self, input: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => input
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(DEFAULT_OUTPUT_DIR_NAME),
        }
    }

    /// Path of the unique-rows artifact
    ///
    /// Examples with the default layout:
    ///   data/orders.xlsx → data/deduplicated/orders_unique.csv
    pub fn unique_path(&self, input: &Path) -> PathBuf {
        self.artifact_path(input, &self.unique_suffix)
    }

    /// Path of the duplicate-rows artifact
    ///
    ///   data/orders.xlsx → data/deduplicated/orders_duplicates.csv
    pub fn duplicate_path(&self, input: &Path) -> PathBuf {
        self.artifact_path(input, &self.duplicate_suffix)
    }

    fn artifact_path(&self, input: &Path, suffix: &str) -> PathBuf {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        self.directory_for(input)
            .join(format!("{}{}.csv", stem, suffix))
    }
}

/// Paths of the artifacts written for one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WrittenArtifacts {
    pub unique: PathBuf,
    /// None when the input had no duplicate rows
    pub duplicates: Option<PathBuf>,
}

/// Write the partitioned rows of `input` according to `layout`.
///
/// `unique_rows` and `duplicate_rows` include the header. Pass `None` for
/// `duplicate_rows` when there are no duplicates: no duplicate file is
/// created, and a stale one left by an earlier run is removed so that its
/// absence keeps meaning "no duplicates".
///
/// Both artifacts are fully staged before either is renamed into place,
/// so a failure while writing leaves the previous results untouched.
pub fn write_results(
    input: &Path,
    layout: &OutputLayout,
    column_count: usize,
    unique_rows: &[Row],
    duplicate_rows: Option<&[Row]>,
) -> Result<WrittenArtifacts> {
    let unique_path = layout.unique_path(input);
    let duplicate_path = layout.duplicate_path(input);

    let unique_file = stage_rows(&unique_path, column_count, unique_rows)?;
    let duplicate_file = duplicate_rows
        .map(|rows| stage_rows(&duplicate_path, column_count, rows))
        .transpose()?;

    // The duplicate artifact goes first: a unique file is never newer than
    // the duplicate file beside it.
    let duplicates = match duplicate_file {
        Some(temp_file) => {
            temp_file.persist(&duplicate_path).map_err(|e| e.error)?;
            Some(duplicate_path)
        }
        None => {
            if duplicate_path.exists() {
                debug!("Removing stale duplicate file {:?}", duplicate_path);
                fs::remove_file(&duplicate_path)?;
            }
            None
        }
    };
    unique_file.persist(&unique_path).map_err(|e| e.error)?;

    info!("Wrote results for {:?} to {:?}", input, layout.directory_for(input));
    Ok(WrittenArtifacts {
        unique: unique_path,
        duplicates,
    })
}

/// Atomically write `rows` as CSV to `path`, padding each row to
/// `column_count` fields.
pub fn write_rows(path: &Path, column_count: usize, rows: &[Row]) -> Result<()> {
    let temp_file = stage_rows(path, column_count, rows)?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write `rows` to a temp file beside `path`; dropping it deletes it
fn stage_rows(path: &Path, column_count: usize, rows: &[Row]) -> Result<NamedTempFile> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut temp_file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .flexible(false)
            .from_writer(&mut temp_file);

        for row in rows {
            let fields = padded_fields(row, column_count);
            writer.write_record(fields.iter().map(|f| f.as_bytes()))?;
        }
        writer.flush()?;
    }
    temp_file.as_file_mut().flush()?;

    debug!("Staged {} rows for {:?}", rows.len(), path);
    Ok(temp_file)
}

fn padded_fields(row: &[Cell], column_count: usize) -> Vec<Cow<'_, str>> {
    let width = column_count.max(row.len());
    (0..width)
        .map(|i| row.get(i).map(Cell::as_field).unwrap_or(Cow::Borrowed("")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(values: &[&str]) -> Row {
        values.iter().map(|v| Cell::from_text(v)).collect()
    }

    #[test]
    fn test_default_layout_paths() {
        let layout = OutputLayout::default();
        let input = Path::new("data/orders.xlsx");

        assert_eq!(layout.directory_for(input), PathBuf::from("data/deduplicated"));
        assert_eq!(
            layout.unique_path(input),
            PathBuf::from("data/deduplicated/orders_unique.csv")
        );
        assert_eq!(
            layout.duplicate_path(input),
            PathBuf::from("data/deduplicated/orders_duplicates.csv")
        );
    }

    #[test]
    fn test_custom_layout_paths() {
        let layout = OutputLayout {
            output_dir: Some(PathBuf::from("/tmp/results")),
            unique_suffix: ".clean".to_string(),
            duplicate_suffix: ".dups".to_string(),
        };
        let input = Path::new("a/b/sales.csv");

        assert_eq!(layout.unique_path(input), PathBuf::from("/tmp/results/sales.clean.csv"));
        assert_eq!(layout.duplicate_path(input), PathBuf::from("/tmp/results/sales.dups.csv"));
    }

    #[test]
    fn test_write_rows_pads_and_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let rows = vec![
            text_row(&["id", "name", "note"]),
            vec![Cell::Number(1.0), Cell::from_text(" Foo ")],
            vec![Cell::Number(2.5), Cell::Bool(true), Cell::from_text("a,b")],
        ];
        write_rows(&path, 3, &rows).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "id,name,note\n1, Foo ,\n2.5,TRUE,\"a,b\"\n");
    }

    #[test]
    fn test_write_results_without_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sheet.csv");
        let layout = OutputLayout::default();
        let unique = vec![text_row(&["h"]), text_row(&["a"])];

        let written = write_results(&input, &layout, 1, &unique, None).unwrap();

        assert!(written.unique.exists());
        assert!(written.duplicates.is_none());
        assert!(!layout.duplicate_path(&input).exists());
    }

    #[test]
    fn test_write_results_removes_stale_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sheet.csv");
        let layout = OutputLayout::default();
        let unique = vec![text_row(&["h"]), text_row(&["a"])];
        let duplicates = vec![text_row(&["h"]), text_row(&["a"])];

        let first = write_results(&input, &layout, 1, &unique, Some(&duplicates)).unwrap();
        let stale = first.duplicates.unwrap();
        assert!(stale.exists());

        write_results(&input, &layout, 1, &unique, None).unwrap();
        assert!(!stale.exists());
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_rows(&path, 1, &[text_row(&["h"])]).unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_failed_duplicate_write_keeps_previous_results() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sheet.csv");
        let layout = OutputLayout::default();
        let unique = vec![text_row(&["h"]), text_row(&["a"])];
        let duplicates = vec![text_row(&["h"]), text_row(&["a"])];

        // A directory where the duplicate file belongs makes its rename fail
        fs::create_dir_all(layout.duplicate_path(&input)).unwrap();

        let result = write_results(&input, &layout, 1, &unique, Some(&duplicates));

        assert!(result.is_err());
        assert!(!layout.unique_path(&input).exists());
        let entries: Vec<_> = fs::read_dir(layout.directory_for(&input)).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
