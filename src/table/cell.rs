use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Excel supports at most 16384 columns, so 16383 is the largest valid index.
pub const MAX_COLUMN_IDX: usize = 16383;

/// A cell position within a worksheet, zero-indexed.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub column: usize,
}

impl Cell {
    pub fn new(row: usize, column: usize) -> Self {
        Cell { row, column }
    }

    /// The spreadsheet-style reference, with the row 1-indexed and the column
    /// in letter form (e.g. "A1", "AA12").
    pub fn str_ref(&self) -> String {
        format!("{}{}", column_index_to_letters(self.column), self.row + 1)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.str_ref())
    }
}

/// Converts a zero-indexed column index to Excel column letters.
///
/// Bijective base-26 over A-Z: 0 -> "A", 25 -> "Z", 26 -> "AA".
pub fn column_index_to_letters(col_idx: usize) -> String {
    debug_assert!(col_idx <= MAX_COLUMN_IDX);
    let mut col_str = String::new();
    let mut idx = col_idx as i64;
    while idx >= 0 {
        let remainder = (idx % 26) as u8;
        col_str.insert(0, (b'A' + remainder) as char);
        idx = idx / 26 - 1;
    }
    col_str
}

/// Converts Excel column letters back to a zero-indexed column index.
///
/// Returns `None` for anything that is not an uppercase A-Z string.
pub fn column_letters_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    let mut idx: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        idx = idx * 26 + (c as usize - 'A' as usize) + 1;
    }
    Some(idx - 1)
}

/// A single worksheet cell value as read from the workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}
