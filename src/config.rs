use crate::validate::checks::Check;
use ordermap::OrderMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// Configuration for extracting tables from a worksheet.
#[derive(Debug, Validate, Deserialize, Serialize, Clone, PartialEq)]
pub struct ExtractConfig {
    /// Table id used to locate the table's start and end tags.
    pub id_tag: String,
    /// The worksheet containing the table.
    pub worksheet_name: String,
}

/// Configuration for processing extracted tables.
#[derive(Debug, Validate, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
#[validate(schema(function = "validate_merged_header_rows"))]
pub struct ProcessConfig {
    /// Number of rows containing header information. Stacked headers are
    /// concatenated to make the column names of the processed table.
    #[validate(range(min = 1))]
    pub num_header_rows: usize,
    /// Header rows containing merged cells, to be forward-filled before
    /// concatenation. `None` forward-fills every header row.
    pub merged_header_rows: Option<Vec<usize>>,
    /// Column names present in the source template but dropped after the
    /// header lift.
    pub col_names_to_drop: Vec<String>,
    /// Body row offsets holding non-data content such as help text
    /// (0 is the first row after the headers).
    pub ignored_non_header_rows: Vec<usize>,
    /// Drop rows with only empty values.
    pub drop_empty_rows: bool,
    /// Elide tables left with no rows, e.g. after `drop_empty_rows`.
    pub drop_empty_tables: bool,
    /// The value dropdowns show as a placeholder when unselected.
    pub dropdown_placeholder: String,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        ProcessConfig {
            num_header_rows: 1,
            merged_header_rows: None,
            col_names_to_drop: vec![],
            ignored_non_header_rows: vec![],
            drop_empty_rows: true,
            drop_empty_tables: true,
            dropdown_placeholder: "< Select >".to_string(),
        }
    }
}

fn validate_merged_header_rows(config: &ProcessConfig) -> Result<(), ValidationError> {
    let Some(merged_header_rows) = &config.merged_header_rows else {
        return Ok(());
    };
    let out_of_range: Vec<usize> = merged_header_rows
        .iter()
        .copied()
        .filter(|row_idx| *row_idx >= config.num_header_rows)
        .collect();
    if out_of_range.is_empty() {
        Ok(())
    } else {
        let mut error = ValidationError::new("merged_header_rows");
        error.add_param(Cow::from("out_of_range"), &out_of_range);
        Err(error.with_message(Cow::Owned(format!(
            "Merged header row indexes {out_of_range:?} must be within the range of specified headers (0-{})",
            config.num_header_rows.saturating_sub(1)
        ))))
    }
}

/// Which occurrences of a duplicated value are reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportDuplicates {
    /// Report every occurrence.
    #[default]
    All,
    /// Report every occurrence after the first.
    ExcludeFirst,
}

/// The checks a single table column must satisfy.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub checks: Vec<Check>,
    /// Whether empty cells are acceptable. Columns are required by default.
    pub nullable: bool,
    /// Whether values in the column must be unique.
    pub unique: bool,
}

impl ColumnConfig {
    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// A column of free text.
pub fn string_column() -> ColumnConfig {
    ColumnConfig::default()
}

/// A column whose values must be coercible to whole numbers.
pub fn int_column() -> ColumnConfig {
    ColumnConfig::default().with_check(Check::IsInt)
}

/// A column whose values must be coercible to numbers.
pub fn float_column() -> ColumnConfig {
    ColumnConfig::default().with_check(Check::IsFloat)
}

/// A column whose values must be coercible to dates.
pub fn datetime_column() -> ColumnConfig {
    ColumnConfig::default().with_check(Check::IsDatetime)
}

/// Configuration for validating processed tables.
#[derive(Debug, Validate, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
#[validate(schema(function = "validate_check_parameters"))]
pub struct ValidateConfig {
    /// Maps column names to the checks their cells must satisfy. The set of
    /// names doubles as the expected column set of the table.
    pub columns: OrderMap<String, ColumnConfig>,
    /// Columns whose combined values must be unique per row.
    pub composite_unique: Vec<String>,
    pub report_duplicates: ReportDuplicates,
}

impl ValidateConfig {
    pub fn with_column(mut self, name: &str, column: ColumnConfig) -> Self {
        self.columns.insert(name.to_string(), column);
        self
    }

    pub fn with_composite_unique(mut self, columns: &[&str]) -> Self {
        self.composite_unique = columns.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_report_duplicates(mut self, report_duplicates: ReportDuplicates) -> Self {
        self.report_duplicates = report_duplicates;
        self
    }
}

fn validate_check_parameters(config: &ValidateConfig) -> Result<(), ValidationError> {
    let undeclared: Vec<&String> = config
        .composite_unique
        .iter()
        .filter(|name| !config.columns.contains_key(*name))
        .collect();
    if !undeclared.is_empty() {
        let mut error = ValidationError::new("composite_unique");
        error.add_param(Cow::from("undeclared"), &undeclared);
        return Err(error.with_message(Cow::Owned(
            "composite_unique names columns that are not declared in the schema".to_string(),
        )));
    }

    for column in config.columns.values() {
        for check in &column.checks {
            if let Check::MatchesRegex(pattern) = check
                && Regex::new(pattern).is_err()
            {
                let mut error = ValidationError::new("invalid_regex");
                error.add_param(Cow::from("regex"), &pattern);
                return Err(error.with_message(Cow::Owned("Invalid Regex string.".to_string())));
            }
        }
    }
    Ok(())
}

/// Configuration for extracting, processing, and validating one table.
#[derive(Debug, Validate, Deserialize, Serialize, Clone, PartialEq)]
pub struct TableConfig {
    #[validate(nested)]
    pub extract: ExtractConfig,
    #[validate(nested)]
    #[serde(default)]
    pub process: ProcessConfig,
    #[validate(nested)]
    #[serde(default)]
    pub validate: ValidateConfig,
}

impl TableConfig {
    pub fn new(id_tag: &str, worksheet_name: &str) -> Self {
        TableConfig {
            extract: ExtractConfig {
                id_tag: id_tag.to_string(),
                worksheet_name: worksheet_name.to_string(),
            },
            process: ProcessConfig::default(),
            validate: ValidateConfig::default(),
        }
    }

    pub fn with_process(mut self, process: ProcessConfig) -> Self {
        self.process = process;
        self
    }

    pub fn with_validate(mut self, validate: ValidateConfig) -> Self {
        self.validate = validate;
        self
    }
}
