use crate::config::{ColumnConfig, ReportDuplicates, ValidateConfig};
use crate::table::Table;
use crate::validate::error::{TableValidationError, TableValidationErrors};
use ordermap::OrderMap;
use std::collections::HashSet;

pub(crate) const NOT_NULLABLE_MESSAGE: &str = "The cell is blank but is required.";
pub(crate) const DUPLICATE_MESSAGE: &str =
    "You entered duplicate data. Remove or replace the duplicate data.";

/// Validates a processed table against its declared column schema.
///
/// Column-set conformance is checked first: a column present in the table but
/// absent from the schema (or vice versa) means the template has drifted, and
/// there is no point checking the cells of columns that should not exist —
/// those failures are raised alone, with no cell reference. Per-cell checks
/// then run eagerly over the whole table so the template author receives the
/// complete list of problems in one submission cycle.
///
/// Example usage:
/// ```ignore
/// let validator = TableValidator::new(config.validate);
/// match validator.validate(&table) {
///     Ok(()) => {}
///     Err(errors) => {
///         for error in &errors.errors {
///             println!("{error}");
///         }
///     }
/// }
/// ```
pub struct TableValidator {
    config: ValidateConfig,
}

impl TableValidator {
    pub fn new(config: ValidateConfig) -> Self {
        TableValidator { config }
    }

    pub fn validate(&self, table: &Table) -> Result<(), TableValidationErrors> {
        let column_set_errors = self.check_column_set(table);
        if !column_set_errors.is_empty() {
            return Err(TableValidationErrors {
                errors: column_set_errors,
            });
        }

        let mut errors = Vec::new();
        for (column, column_config) in &self.config.columns {
            self.check_column(table, column, column_config, &mut errors);
        }
        self.check_composite_unique(table, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(TableValidationErrors { errors })
        }
    }

    fn check_column_set(&self, table: &Table) -> Vec<TableValidationError> {
        let table_columns: HashSet<&str> = table.column_names().collect();
        let schema_columns: HashSet<&str> =
            self.config.columns.keys().map(String::as_str).collect();

        let mut errors = Vec::new();
        for column in table.column_names() {
            if !schema_columns.contains(column) {
                errors.push(TableValidationError {
                    message: format!("Table column '{column}' is not in the schema."),
                    cell: None,
                });
            }
        }
        for column in self.config.columns.keys() {
            if !table_columns.contains(column.as_str()) {
                errors.push(TableValidationError {
                    message: format!("Schema column '{column}' is not in the table."),
                    cell: None,
                });
            }
        }
        errors
    }

    fn check_column(
        &self,
        table: &Table,
        column: &str,
        column_config: &ColumnConfig,
        errors: &mut Vec<TableValidationError>,
    ) {
        for row_idx in 0..table.n_rows() {
            let value = table
                .value_by_name(row_idx, column)
                .expect("column presence was checked against the schema");

            if value.is_empty() {
                if !column_config.nullable {
                    errors.push(TableValidationError {
                        message: NOT_NULLABLE_MESSAGE.to_string(),
                        cell: Some(table.get_cell(row_idx, column)),
                    });
                }
                continue;
            }

            for check in &column_config.checks {
                if !check.passes(value) {
                    errors.push(TableValidationError {
                        message: check.message(),
                        cell: Some(table.get_cell(row_idx, column)),
                    });
                }
            }
        }

        if column_config.unique {
            self.check_unique(table, &[column], errors);
        }
    }

    fn check_composite_unique(&self, table: &Table, errors: &mut Vec<TableValidationError>) {
        if self.config.composite_unique.is_empty() {
            return;
        }
        let columns: Vec<&str> = self
            .config
            .composite_unique
            .iter()
            .map(String::as_str)
            .collect();
        self.check_unique(table, &columns, errors);
    }

    /// Flags rows whose combined value over `columns` occurs more than once.
    /// Rows where every involved cell is empty are not considered duplicates
    /// of each other.
    fn check_unique(
        &self,
        table: &Table,
        columns: &[&str],
        errors: &mut Vec<TableValidationError>,
    ) {
        let mut rows_by_key: OrderMap<Vec<String>, Vec<usize>> = OrderMap::new();
        for row_idx in 0..table.n_rows() {
            let values: Vec<_> = columns
                .iter()
                .map(|column| {
                    table
                        .value_by_name(row_idx, column)
                        .expect("column presence was checked against the schema")
                })
                .collect();
            if values.iter().all(|value| value.is_empty()) {
                continue;
            }
            let key = values.iter().map(|value| value.to_string()).collect();
            rows_by_key.entry(key).or_default().push(row_idx);
        }

        for duplicated_rows in rows_by_key.values().filter(|rows| rows.len() > 1) {
            let reported = match self.config.report_duplicates {
                ReportDuplicates::All => &duplicated_rows[..],
                ReportDuplicates::ExcludeFirst => &duplicated_rows[1..],
            };
            for &row_idx in reported {
                for column in columns {
                    errors.push(TableValidationError {
                        message: DUPLICATE_MESSAGE.to_string(),
                        cell: Some(table.get_cell(row_idx, column)),
                    });
                }
            }
        }
    }
}
