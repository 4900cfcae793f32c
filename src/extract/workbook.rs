use crate::extract::error::ExtractionError;
use crate::table::CellValue;
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use log::warn;
use ordermap::OrderMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A single worksheet grid. Row and column indices are absolute worksheet
/// coordinates, so a value at `sheet[r][c]` sits in spreadsheet cell (r, c).
pub type Sheet = Vec<Vec<CellValue>>;

/// An in-memory workbook: one cell grid per worksheet, read once up front.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    sheets: OrderMap<String, Sheet>,
}

impl Workbook {
    /// Reads every worksheet of an `.xlsx` file into memory.
    pub fn open(path: &Path) -> Result<Self, ExtractionError> {
        let mut workbook: Xlsx<BufReader<File>> = open_workbook(path)?;
        let mut sheets = OrderMap::new();
        for sheet_name in workbook.sheet_names() {
            let range = workbook.worksheet_range(&sheet_name)?;
            let grid = grid_from_range(&sheet_name, &range);
            sheets.insert(sheet_name, grid);
        }
        Ok(Workbook { sheets })
    }

    /// Builds a workbook from already-materialized grids.
    pub fn from_sheets(sheets: impl IntoIterator<Item = (String, Sheet)>) -> Self {
        Workbook {
            sheets: sheets.into_iter().collect(),
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.get(name)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }
}

/// Converts a calamine cell range into an absolute-coordinate grid.
///
/// Calamine ranges start at the first used cell, so the grid is padded with
/// empty rows and columns to keep worksheet coordinates intact.
fn grid_from_range(sheet_name: &str, range: &Range<Data>) -> Sheet {
    let (first_row, first_col) = range
        .start()
        .map_or((0, 0), |(r, c)| (r as usize, c as usize));

    let mut grid: Sheet = Vec::with_capacity(first_row + range.height());
    grid.resize_with(first_row, Vec::new);

    for (row_idx, row) in range.rows().enumerate() {
        let mut grid_row = vec![CellValue::Empty; first_col + row.len()];
        for (col_idx, cell_data) in row.iter().enumerate() {
            let value = match *cell_data {
                Data::Empty => CellValue::Empty,
                Data::Int(ref i) => CellValue::Int(*i),
                Data::Bool(ref b) => CellValue::Bool(*b),
                Data::Float(ref f) => CellValue::Float(*f),
                Data::Error(ref e) => {
                    warn!(
                        "An error {e} in Excel Worksheet {sheet_name} was found at row {row_idx}, column {col_idx}."
                    );
                    CellValue::Empty
                }
                Data::DateTime(ref d) => match d.as_datetime() {
                    Some(dt) => CellValue::DateTime(dt),
                    None => {
                        warn!(
                            "Could not interpret Excel DateTime in worksheet {sheet_name} at row {row_idx}, column {col_idx}. Entry converted to f64."
                        );
                        CellValue::Float(d.as_f64())
                    }
                },
                Data::String(ref s) | Data::DateTimeIso(ref s) | Data::DurationIso(ref s) => {
                    CellValue::String(s.clone())
                }
            };
            grid_row[first_col + col_idx] = value;
        }
        grid.push(grid_row);
    }

    grid
}
