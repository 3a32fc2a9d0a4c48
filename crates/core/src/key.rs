//! Key columns and comparison keys
//!
//! A `KeySpec` names the 1-based columns whose values identify a row.
//! `KeySpec::extract` turns a row into a `KeyTuple` under these rules:
//!
//! - a missing or out-of-range cell is `KeyValue::Empty`
//! - text is trimmed; text that is then empty is `KeyValue::Empty`
//! - numbers compare by value, and text that parses as a finite number
//!   is that number, so `1`, `1.0` and `" 1 "` are equal
//! - other text compares case-sensitively unless
//!   `NormalizeOptions::case_sensitive` is off
//! - values are ordered by ascending column index

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use sheetdedup_formats::Cell;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Options controlling how cell values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Compare text case-sensitively (default: true)
    pub case_sensitive: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            case_sensitive: true,
        }
    }
}

impl NormalizeOptions {
    pub fn case_insensitive() -> Self {
        Self {
            case_sensitive: false,
        }
    }
}

/// A normalized cell value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    Empty,
    /// Bit pattern of a canonical f64
    Number(u64),
    Text(String),
    Bool(bool),
}

impl KeyValue {
    /// Canonical number key; `-0.0` and `0.0` map to the same value
    pub fn number(value: f64) -> Self {
        let value = if value == 0.0 { 0.0 } else { value };
        KeyValue::Number(value.to_bits())
    }

    pub fn from_cell(cell: Option<&Cell>, options: &NormalizeOptions) -> Self {
        match cell {
            None | Some(Cell::Empty) => KeyValue::Empty,
            Some(Cell::Number(n)) => KeyValue::number(*n),
            Some(Cell::Bool(b)) => KeyValue::Bool(*b),
            Some(Cell::Text(text)) => Self::from_text(text, options),
        }
    }

    fn from_text(text: &str, options: &NormalizeOptions) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return KeyValue::Empty;
        }

        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => KeyValue::number(n),
            _ if options.case_sensitive => KeyValue::Text(trimmed.to_string()),
            _ => KeyValue::Text(trimmed.to_lowercase()),
        }
    }
}

/// Comparison key of one row: normalized values in ascending column order
pub type KeyTuple = Vec<KeyValue>;

/// Highest column a key may name (XFD, the last spreadsheet column)
pub const MAX_KEY_COLUMN: usize = 16_384;

/// Set of 1-based key column indices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeySpec {
    columns: BTreeSet<usize>,
}

impl KeySpec {
    /// Build a key spec; repeated indices collapse, 0 and indices above
    /// `MAX_KEY_COLUMN` are rejected
    pub fn new<I: IntoIterator<Item = usize>>(columns: I) -> Result<Self> {
        let columns: BTreeSet<usize> = columns.into_iter().collect();
        if columns.contains(&0) {
            return Err(Error::InvalidKeySpec(
                "column indices start at 1".to_string(),
            ));
        }
        if let Some(&max) = columns.last() {
            check_column_limit(max)?;
        }
        Ok(Self { columns })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Key columns in ascending order
    pub fn columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns.iter().copied()
    }

    pub fn max_column(&self) -> Option<usize> {
        self.columns.last().copied()
    }

    /// Check that every key column exists in a dataset of `column_count` columns
    pub fn validate_for(&self, column_count: usize) -> Result<()> {
        match self.max_column() {
            Some(max) if max > column_count => Err(Error::InvalidKeySpec(format!(
                "column {} selected but the file has only {} columns",
                max, column_count
            ))),
            _ => Ok(()),
        }
    }

    /// Extract the comparison key of `row`
    pub fn extract(&self, row: &[Cell], options: &NormalizeOptions) -> KeyTuple {
        self.columns
            .iter()
            .map(|&col| KeyValue::from_cell(row.get(col - 1), options))
            .collect()
    }
}

impl FromStr for KeySpec {
    type Err = Error;

    /// Parse a column list such as `1,3-5`
    fn from_str(s: &str) -> Result<Self> {
        let mut columns = Vec::new();

        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((start, end)) => {
                    let start = parse_column(start)?;
                    let end = parse_column(end)?;
                    if start > end {
                        return Err(Error::InvalidKeySpec(format!(
                            "range {} is reversed",
                            part
                        )));
                    }
                    columns.extend(start..=end);
                }
                None => columns.push(parse_column(part)?),
            }
        }

        Self::new(columns)
    }
}

fn parse_column(s: &str) -> Result<usize> {
    let column = s
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::InvalidKeySpec(format!("{:?} is not a column number", s.trim())))?;
    check_column_limit(column)?;
    Ok(column)
}

fn check_column_limit(column: usize) -> Result<()> {
    if column > MAX_KEY_COLUMN {
        return Err(Error::InvalidKeySpec(format!(
            "column {} is beyond the last spreadsheet column ({})",
            column, MAX_KEY_COLUMN
        )));
    }
    Ok(())
}

impl fmt::Display for KeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let columns: Vec<String> = self.columns.iter().map(usize::to_string).collect();
        f.write_str(&columns.join(","))
    }
}
