//! In-memory tabular dataset

use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    /// Build a cell from raw text, mapping the empty string to `Cell::Empty`
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Render the cell the way it is written to output files
    pub fn as_field(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Text(s) => Cow::Borrowed(s),
            // f64's Display already drops a trailing ".0"
            Cell::Number(n) => Cow::Owned(n.to_string()),
            Cell::Bool(true) => Cow::Borrowed("TRUE"),
            Cell::Bool(false) => Cow::Borrowed("FALSE"),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_field())
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Cell::from_text(text)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// One row of cells; may be shorter than the dataset's column count
pub type Row = Vec<Cell>;

/// Row and column counts of a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DatasetShape {
    /// Number of rows, header included
    pub rows: usize,
    /// Widest row in the dataset
    pub columns: usize,
}

/// An ordered sequence of rows whose first row is the header.
///
/// The column count is the width of the widest row and is fixed when the
/// dataset is built, so callers get both counts without a second pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    rows: Vec<Row>,
    column_count: usize,
}

impl Dataset {
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let column_count = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, column_count }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.column_count
    }

    pub fn shape(&self) -> DatasetShape {
        DatasetShape {
            rows: self.row_count(),
            columns: self.column_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// All rows after the header
    pub fn data_rows(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}
