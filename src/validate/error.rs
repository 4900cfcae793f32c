use crate::table::Cell;
use std::fmt;
use thiserror::Error;

/// A single validation failure. Failures raised against a specific cell carry
/// the originating worksheet cell; whole-table failures (column-set
/// mismatches) carry none.
#[derive(Debug, Clone, PartialEq)]
pub struct TableValidationError {
    pub message: String,
    pub cell: Option<Cell>,
}

impl fmt::Display for TableValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cell {
            Some(cell) => write!(f, "{} See cell {}.", self.message, cell.str_ref()),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Every validation failure found in one table, collected in a single pass.
#[derive(Debug, Error)]
#[error("Table validation failed with {} error(s).", .errors.len())]
pub struct TableValidationErrors {
    pub errors: Vec<TableValidationError>,
}
