use crate::table::cell::{Cell, CellValue};
use log::info;
use ordermap::OrderMap;
use polars::frame::DataFrame;
use polars::prelude::TimeUnit::Milliseconds;
use polars::prelude::{AnyValue, Column, IntoColumn, NamedFrom, PolarsError, Series};

/// A table region carved out of a worksheet.
///
/// The grid keeps every column of the carved region; `col_idx_map` records,
/// per lifted column name, the column's index within that region. Columns
/// dropped during processing simply lose their map entry, so the remaining
/// entries always point back at the correct worksheet column. `row_offsets`
/// does the same job for rows: one entry per retained body row, holding the
/// row's offset from `first_row_idx` in the source worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub(crate) grid: Vec<Vec<CellValue>>,
    pub(crate) id_tag: String,
    pub(crate) worksheet: String,
    pub(crate) first_row_idx: usize,
    pub(crate) first_col_idx: usize,
    pub(crate) col_idx_map: OrderMap<String, usize>,
    pub(crate) row_offsets: Vec<usize>,
}

impl Table {
    /// Builds a table from a freshly carved grid. `start_tag` is the position
    /// of the start tag cell; the table body begins one row below it.
    pub fn new(grid: Vec<Vec<CellValue>>, id_tag: String, worksheet: String, start_tag: Cell) -> Self {
        let row_offsets = (0..grid.len()).collect();
        Table {
            grid,
            id_tag,
            worksheet,
            first_row_idx: start_tag.row + 1,
            first_col_idx: start_tag.column,
            col_idx_map: OrderMap::new(),
            row_offsets,
        }
    }

    pub fn id_tag(&self) -> &str {
        &self.id_tag
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    /// Number of rows currently in the table body.
    pub fn n_rows(&self) -> usize {
        self.grid.len()
    }

    /// Width of the carved region, in columns.
    pub fn width(&self) -> usize {
        self.grid.first().map_or(0, Vec::len)
    }

    /// Whether headers have been lifted into column names yet.
    pub fn is_processed(&self) -> bool {
        !self.col_idx_map.is_empty()
    }

    /// The lifted column names, in worksheet order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.col_idx_map.keys().map(String::as_str)
    }

    /// Looks up a body cell by row position and lifted column name.
    pub fn value_by_name(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col_idx = self.col_idx_map.get(column)?;
        self.grid.get(row).and_then(|r| r.get(*col_idx))
    }

    /// Maps a table-scope position back to the originating worksheet cell.
    ///
    /// Panics if the column name was never lifted or the row is out of range;
    /// both indicate a caller bug, not bad user data.
    pub fn get_cell(&self, row: usize, column: &str) -> Cell {
        let col_idx = self
            .col_idx_map
            .get(column)
            .unwrap_or_else(|| panic!("column '{column}' is not present in table {}", self.id_tag));
        let row_offset = self
            .row_offsets
            .get(row)
            .unwrap_or_else(|| panic!("row {row} is not present in table {}", self.id_tag));
        Cell::new(self.first_row_idx + row_offset, self.first_col_idx + col_idx)
    }

    /// Converts the table body into a `DataFrame` with one column per lifted
    /// column name, for the downstream transformation stage.
    pub fn into_data_frame(self) -> Result<DataFrame, PolarsError> {
        let columns = self
            .col_idx_map
            .iter()
            .map(|(name, col_idx)| {
                let values: Vec<AnyValue> = self
                    .grid
                    .iter()
                    .map(|row| match &row[*col_idx] {
                        CellValue::Empty => AnyValue::Null,
                        CellValue::String(s) => AnyValue::StringOwned(s.as_str().into()),
                        CellValue::Int(i) => AnyValue::Int64(*i),
                        CellValue::Float(f) => AnyValue::Float64(*f),
                        CellValue::Bool(b) => AnyValue::Boolean(*b),
                        CellValue::DateTime(dt) => {
                            AnyValue::Datetime(dt.and_utc().timestamp_millis(), Milliseconds, None)
                        }
                    })
                    .collect();

                let series_result = Series::from_any_values(name.as_str().into(), &values, true);

                //if the from_any_values function fails to convert the values to a single type
                //we stringify the data to create the series
                let series = series_result.unwrap_or_else(|_| {
                    info!(
                        "Column {} in table {} contained multiple data types. These have been turned into strings.",
                        name, self.id_tag
                    );
                    let stringified_col_data: Vec<Option<String>> = self
                        .grid
                        .iter()
                        .map(|row| match &row[*col_idx] {
                            CellValue::Empty => None,
                            value => Some(value.to_string()),
                        })
                        .collect();
                    Series::new(name.as_str().into(), stringified_col_data)
                });

                series.into_column()
            })
            .collect::<Vec<Column>>();

        DataFrame::new(columns)
    }
}
