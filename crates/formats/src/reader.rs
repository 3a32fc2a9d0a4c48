//! Unified dataset loader
//!
//! Detects the input format from the file extension and dispatches to
//! the CSV or workbook reader.

use crate::{csv_reader, workbook, Dataset, DatasetShape, Error, Result};
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Extensions handled by the workbook reader
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Workbook,
}

impl InputFormat {
    /// Detect the format from a path's extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        if extension == "csv" {
            Some(InputFormat::Csv)
        } else if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
            Some(InputFormat::Workbook)
        } else {
            None
        }
    }
}

/// Whether `path` has an extension this crate can load
pub fn is_supported(path: &Path) -> bool {
    InputFormat::from_path(path).is_some()
}

/// Load a dataset with automatic format detection
///
/// Supported formats:
/// - `.csv` - comma separated values
/// - `.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods` - first worksheet only
///
/// Missing or locked files fail with `Error::FileAccess`; unsupported,
/// corrupt and empty files fail with `Error::FileFormat`.
pub fn open_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();

    // Probe access first so missing and locked files are reported as such
    // rather than as parse failures.
    File::open(path).map_err(|e| Error::access(path, e))?;

    let format = InputFormat::from_path(path).ok_or_else(|| {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Error::format(path, format!("unsupported file extension: {:?}", extension))
    })?;

    let dataset = match format {
        InputFormat::Csv => csv_reader::read_csv(path)?,
        InputFormat::Workbook => workbook::read_workbook(path)?,
    };

    if dataset.is_empty() {
        return Err(Error::format(path, "file contains no rows"));
    }

    info!(
        "Loaded {:?} ({} rows, {} columns)",
        path,
        dataset.row_count(),
        dataset.column_count()
    );
    Ok(dataset)
}

/// Report the row and column counts of a file
pub fn inspect<P: AsRef<Path>>(path: P) -> Result<DatasetShape> {
    open_dataset(path).map(|dataset| dataset.shape())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(InputFormat::from_path(Path::new("a.csv")), Some(InputFormat::Csv));
        assert_eq!(InputFormat::from_path(Path::new("a.XLSX")), Some(InputFormat::Workbook));
        assert_eq!(InputFormat::from_path(Path::new("a.ods")), Some(InputFormat::Workbook));
        assert_eq!(InputFormat::from_path(Path::new("a.txt")), None);
        assert_eq!(InputFormat::from_path(Path::new("noext")), None);
        assert!(is_supported(Path::new("report.xls")));
    }

    #[test]
    fn test_open_csv_dataset() {
        let file = csv_file("id,name\n1,a\n2,b\n");
        let dataset = open_dataset(file.path()).unwrap();
        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.column_count(), 2);
    }

    #[test]
    fn test_inspect_shape() {
        let file = csv_file("a,b,c\n1,2\n");
        let shape = inspect(file.path()).unwrap();
        assert_eq!(shape, DatasetShape { rows: 2, columns: 3 });
    }

    #[test]
    fn test_empty_file_is_format_error() {
        let file = csv_file("");
        let result = open_dataset(file.path());
        assert!(matches!(result, Err(Error::FileFormat { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let mut temp_file = Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(temp_file, "a,b").unwrap();

        let result = open_dataset(temp_file.path());
        assert!(matches!(result, Err(Error::FileFormat { .. })));
    }

    #[test]
    fn test_missing_file_is_access_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = open_dataset(dir.path().join("gone.xlsx"));
        assert!(matches!(result, Err(Error::FileAccess { .. })));
    }
}
