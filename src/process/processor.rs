use crate::config::ProcessConfig;
use crate::process::error::ProcessingError;
use crate::table::{CellValue, Table};

const HEADER_SEPARATOR: &str = ", ";

/// Cleans and reshapes a carved table according to its process configuration.
///
/// Stages run in a fixed order: header lift, column pruning, ignored-row
/// removal, dropdown-placeholder normalization, whitespace stripping, then
/// the optional empty-row and empty-table elisions. A table whose headers
/// were already lifted is returned untouched, so processing is idempotent.
///
/// Example usage:
/// ```ignore
/// let processor = TableProcessor::new(config.process);
/// let processed = processor.process(table)?;
/// ```
pub struct TableProcessor {
    config: ProcessConfig,
}

impl TableProcessor {
    pub fn new(config: ProcessConfig) -> Self {
        TableProcessor { config }
    }

    /// Processes the table, consuming it. Returns `None` when empty-table
    /// elision applies: every body row was dropped, leaving nothing to
    /// validate.
    pub fn process(&self, mut table: Table) -> Result<Option<Table>, ProcessingError> {
        if table.is_processed() {
            return Ok(Some(table));
        }

        self.lift_header(&mut table);
        self.drop_cols_by_name(&mut table)?;
        self.remove_ignored_non_header_rows(&mut table);
        self.replace_dropdown_placeholder(&mut table);
        Self::strip_whitespace(&mut table);

        if self.config.drop_empty_rows {
            Self::drop_empty_rows(&mut table);
        }

        if self.config.drop_empty_tables && table.n_rows() == 0 {
            return Ok(None);
        }

        Ok(Some(table))
    }

    /// Lifts the first N rows into column names.
    ///
    /// Merged cells in the source template are read back as one filled cell
    /// followed by blanks, so the affected header rows are forward-filled
    /// before the rows are concatenated top-to-bottom per column. Columns
    /// that end up with a name already taken (merged cells spanning columns)
    /// keep only the first occurrence in the column map.
    fn lift_header(&self, table: &mut Table) {
        let num_header_rows = self.config.num_header_rows.min(table.n_rows());
        let width = table.width();

        let body = table.grid.split_off(num_header_rows);
        let mut header: Vec<Vec<Option<String>>> = table
            .grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        CellValue::Empty => None,
                        value => {
                            let text = value.to_string().trim().to_string();
                            if text.is_empty() { None } else { Some(text) }
                        }
                    })
                    .collect()
            })
            .collect();

        let rows_to_ffill: Vec<usize> = match &self.config.merged_header_rows {
            Some(rows) => rows.clone(),
            None => (0..num_header_rows).collect(),
        };
        for row_idx in rows_to_ffill {
            if let Some(row) = header.get_mut(row_idx) {
                let mut last_filled: Option<String> = None;
                for cell in row.iter_mut() {
                    match cell {
                        Some(value) => last_filled = Some(value.clone()),
                        None => *cell = last_filled.clone(),
                    }
                }
            }
        }

        for col_idx in 0..width {
            let concatenated = header
                .iter()
                .filter_map(|row| row.get(col_idx).cloned().flatten())
                .collect::<Vec<String>>()
                .join(HEADER_SEPARATOR);
            if !table.col_idx_map.contains_key(&concatenated) {
                table.col_idx_map.insert(concatenated, col_idx);
            }
        }

        table.grid = body;
        table.first_row_idx += num_header_rows;
        table.row_offsets = (0..table.grid.len()).collect();
    }

    fn drop_cols_by_name(&self, table: &mut Table) -> Result<(), ProcessingError> {
        let missing_cols: Vec<String> = self
            .config
            .col_names_to_drop
            .iter()
            .filter(|col| !table.col_idx_map.contains_key(*col))
            .cloned()
            .collect();
        if !missing_cols.is_empty() {
            return Err(ProcessingError::ColumnsToDropMissing(missing_cols));
        }
        for col in &self.config.col_names_to_drop {
            table.col_idx_map.remove(col);
        }
        Ok(())
    }

    /// Drops the configured body-row offsets (0 is the first row after the
    /// headers). Offsets beyond the table are ignored.
    fn remove_ignored_non_header_rows(&self, table: &mut Table) {
        let mut row_idxs = self.config.ignored_non_header_rows.clone();
        row_idxs.sort_unstable();
        row_idxs.dedup();
        for row_idx in row_idxs.into_iter().rev() {
            if row_idx < table.grid.len() {
                table.grid.remove(row_idx);
                table.row_offsets.remove(row_idx);
            }
        }
    }

    /// Sets cells still holding the unselected-dropdown placeholder to empty.
    fn replace_dropdown_placeholder(&self, table: &mut Table) {
        let col_idxs: Vec<usize> = table.col_idx_map.values().copied().collect();
        for row in &mut table.grid {
            for &col_idx in &col_idxs {
                if row[col_idx].as_str() == Some(self.config.dropdown_placeholder.as_str()) {
                    row[col_idx] = CellValue::Empty;
                }
            }
        }
    }

    /// Strips whitespace from string cells; a cell that strips down to
    /// nothing becomes empty.
    fn strip_whitespace(table: &mut Table) {
        let col_idxs: Vec<usize> = table.col_idx_map.values().copied().collect();
        for row in &mut table.grid {
            for &col_idx in &col_idxs {
                if let CellValue::String(s) = &row[col_idx] {
                    let stripped = s.trim();
                    if stripped.is_empty() {
                        row[col_idx] = CellValue::Empty;
                    } else if stripped.len() != s.len() {
                        row[col_idx] = CellValue::String(stripped.to_string());
                    }
                }
            }
        }
    }

    /// Drops rows where every mapped column is empty.
    fn drop_empty_rows(table: &mut Table) {
        let col_idxs: Vec<usize> = table.col_idx_map.values().copied().collect();
        let rows = std::mem::take(&mut table.grid);
        let offsets = std::mem::take(&mut table.row_offsets);
        for (row, offset) in rows.into_iter().zip(offsets) {
            if col_idxs.iter().any(|&col_idx| !row[col_idx].is_empty()) {
                table.grid.push(row);
                table.row_offsets.push(offset);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn row(values: &[&str]) -> Vec<CellValue> {
        values
            .iter()
            .map(|v| {
                if v.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::from(*v)
                }
            })
            .collect()
    }

    fn carved_table(grid: Vec<Vec<CellValue>>) -> Table {
        // Start tag at B2: body carved from row 2, column 1.
        Table::new(grid, "TEST-TABLE".to_string(), "Sheet1".to_string(), Cell::new(1, 1))
    }

    fn column_names(table: &Table) -> Vec<&str> {
        table.column_names().collect()
    }

    #[rstest]
    fn test_lift_single_header_row() {
        let table = carved_table(vec![
            row(&["Name", "Amount"]),
            row(&["a", "1"]),
        ]);
        let processed = TableProcessor::new(ProcessConfig::default())
            .process(table)
            .unwrap()
            .unwrap();

        assert_eq!(column_names(&processed), vec!["Name", "Amount"]);
        assert_eq!(processed.n_rows(), 1);
        assert_eq!(processed.first_row_idx, 3);
        assert_eq!(processed.get_cell(0, "Amount").str_ref(), "C4");
    }

    #[rstest]
    fn test_lift_multi_row_header_forward_fills_and_concatenates() {
        let table = carved_table(vec![
            row(&["Quarter 1", "", "Quarter 2"]),
            row(&["Spend", "Forecast", "Spend"]),
            row(&["", "", ""]),
            row(&["1", "2", "3"]),
        ]);
        let config = ProcessConfig {
            num_header_rows: 3,
            ..ProcessConfig::default()
        };
        let processed = TableProcessor::new(config).process(table).unwrap().unwrap();

        assert_eq!(
            column_names(&processed),
            vec!["Quarter 1, Spend", "Quarter 1, Forecast", "Quarter 2, Spend"]
        );
        assert_eq!(processed.n_rows(), 1);
    }

    #[rstest]
    fn test_lift_header_only_fills_configured_merged_rows() {
        let table = carved_table(vec![
            row(&["Section", "", ""]),
            row(&["A", "", "C"]),
            row(&["1", "2", "3"]),
        ]);
        let config = ProcessConfig {
            num_header_rows: 2,
            merged_header_rows: Some(vec![0]),
            ..ProcessConfig::default()
        };
        let processed = TableProcessor::new(config).process(table).unwrap().unwrap();

        // Row 0 is forward-filled, row 1 is not.
        assert_eq!(
            column_names(&processed),
            vec!["Section, A", "Section", "Section, C"]
        );
    }

    #[rstest]
    fn test_merged_header_duplicate_columns_collapse_to_first() {
        let table = carved_table(vec![
            row(&["Merged", "", "Other"]),
            row(&["1", "2", "3"]),
        ]);
        let processed = TableProcessor::new(ProcessConfig::default())
            .process(table)
            .unwrap()
            .unwrap();

        assert_eq!(column_names(&processed), vec!["Merged", "Other"]);
        // The collapsed column keeps the first occurrence's position.
        assert_eq!(processed.get_cell(0, "Merged").str_ref(), "B4");
        assert_eq!(processed.get_cell(0, "Other").str_ref(), "D4");
    }

    #[rstest]
    fn test_drop_cols_by_name() {
        let table = carved_table(vec![
            row(&["Keep", "Drop"]),
            row(&["a", "b"]),
        ]);
        let config = ProcessConfig {
            col_names_to_drop: vec!["Drop".to_string()],
            ..ProcessConfig::default()
        };
        let processed = TableProcessor::new(config).process(table).unwrap().unwrap();

        assert_eq!(column_names(&processed), vec!["Keep"]);
        assert_eq!(processed.get_cell(0, "Keep").str_ref(), "B4");
    }

    #[rstest]
    fn test_drop_missing_col_is_an_error() {
        let table = carved_table(vec![row(&["Keep"]), row(&["a"])]);
        let config = ProcessConfig {
            col_names_to_drop: vec!["Absent".to_string()],
            ..ProcessConfig::default()
        };
        let result = TableProcessor::new(config).process(table);
        assert!(matches!(
            result,
            Err(ProcessingError::ColumnsToDropMissing(cols)) if cols == vec!["Absent".to_string()]
        ));
    }

    #[rstest]
    fn test_ignored_rows_removed_and_out_of_range_ignored() {
        let table = carved_table(vec![
            row(&["Name"]),
            row(&["instructional text"]),
            row(&["a"]),
            row(&["b"]),
        ]);
        let config = ProcessConfig {
            ignored_non_header_rows: vec![0, 10],
            ..ProcessConfig::default()
        };
        let processed = TableProcessor::new(config).process(table).unwrap().unwrap();

        assert_eq!(processed.n_rows(), 2);
        assert_eq!(processed.value_by_name(0, "Name"), Some(&CellValue::from("a")));
        // Row "a" still maps to its original worksheet position.
        assert_eq!(processed.get_cell(0, "Name").str_ref(), "B5");
    }

    #[rstest]
    fn test_dropdown_placeholder_normalized() {
        let table = carved_table(vec![
            row(&["Status"]),
            row(&["< Select >"]),
            row(&["Planning"]),
        ]);
        let config = ProcessConfig {
            drop_empty_rows: false,
            ..ProcessConfig::default()
        };
        let processed = TableProcessor::new(config).process(table).unwrap().unwrap();

        assert_eq!(processed.value_by_name(0, "Status"), Some(&CellValue::Empty));
        assert_eq!(
            processed.value_by_name(1, "Status"),
            Some(&CellValue::from("Planning"))
        );
    }

    #[rstest]
    fn test_whitespace_stripped_and_blank_strings_emptied() {
        let table = carved_table(vec![
            row(&["Name", "Note"]),
            vec![CellValue::from("  padded  "), CellValue::from("   ")],
        ]);
        let config = ProcessConfig {
            drop_empty_rows: false,
            ..ProcessConfig::default()
        };
        let processed = TableProcessor::new(config).process(table).unwrap().unwrap();

        assert_eq!(
            processed.value_by_name(0, "Name"),
            Some(&CellValue::from("padded"))
        );
        assert_eq!(processed.value_by_name(0, "Note"), Some(&CellValue::Empty));
    }

    #[rstest]
    fn test_drop_empty_rows_keeps_partially_filled() {
        let table = carved_table(vec![
            row(&["Name", "Amount"]),
            vec![CellValue::from("x"), CellValue::Int(1)],
            vec![CellValue::from("y"), CellValue::Empty],
            vec![CellValue::Empty, CellValue::Empty],
        ]);
        let processed = TableProcessor::new(ProcessConfig::default())
            .process(table)
            .unwrap()
            .unwrap();

        assert_eq!(processed.n_rows(), 2);
        assert_eq!(processed.value_by_name(0, "Name"), Some(&CellValue::from("x")));
        assert_eq!(processed.value_by_name(1, "Name"), Some(&CellValue::from("y")));
    }

    #[rstest]
    fn test_empty_row_elision_keeps_cell_references_exact() {
        let table = carved_table(vec![
            row(&["Name"]),
            row(&[""]),
            row(&["after gap"]),
        ]);
        let processed = TableProcessor::new(ProcessConfig::default())
            .process(table)
            .unwrap()
            .unwrap();

        assert_eq!(processed.n_rows(), 1);
        // "after gap" sits two rows below the header in the worksheet.
        assert_eq!(processed.get_cell(0, "Name").str_ref(), "B5");
    }

    #[rstest]
    fn test_empty_table_elided_to_none() {
        let table = carved_table(vec![row(&["Name"]), row(&[""])]);
        let processed = TableProcessor::new(ProcessConfig::default())
            .process(table)
            .unwrap();
        assert_eq!(processed, None);
    }

    #[rstest]
    fn test_empty_table_retained_when_elision_disabled() {
        let table = carved_table(vec![row(&["Name"]), row(&[""])]);
        let config = ProcessConfig {
            drop_empty_tables: false,
            ..ProcessConfig::default()
        };
        let processed = TableProcessor::new(config).process(table).unwrap().unwrap();
        assert_eq!(processed.n_rows(), 0);
    }

    #[rstest]
    fn test_processing_is_idempotent() {
        let table = carved_table(vec![
            row(&["Name", "Amount"]),
            row(&["a", "1"]),
            row(&["", ""]),
        ]);
        let processor = TableProcessor::new(ProcessConfig::default());

        let once = processor.process(table).unwrap().unwrap();
        let twice = processor.process(once.clone()).unwrap().unwrap();
        assert_eq!(once, twice);
    }
}
