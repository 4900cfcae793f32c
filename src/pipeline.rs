use crate::config::TableConfig;
use crate::error::PipelineError;
use crate::extract::{TableExtractor, Workbook};
use crate::process::TableProcessor;
use crate::validate::TableValidator;
use log::{info, warn};
use ordermap::OrderMap;
use polars::frame::DataFrame;
use serde::Serialize;
use validator::Validate;

/// A user-facing validation message, ready to be serialized into the ingest
/// endpoint's `validation_errors` response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// The worksheet the failing table lives in.
    pub sheet: String,
    /// The table (section) name from the pipeline configuration.
    pub section: String,
    /// Spreadsheet cell reference, absent for whole-table failures.
    pub cell_index: Option<String>,
    pub description: String,
}

/// The result of one pipeline run over a workbook.
#[derive(Debug, Default)]
pub struct PipelineOutcome {
    /// Validated tables, keyed by table name, ready for the downstream
    /// transformation stage.
    pub tables: OrderMap<String, DataFrame>,
    /// Cell-addressed validation messages, collected across all tables.
    pub error_messages: Vec<Message>,
    /// Tables that failed hard during extraction or processing. A failure
    /// here aborts only the table it belongs to.
    pub failed: OrderMap<String, PipelineError>,
}

/// Runs extract, process and validate for every configured table of a
/// workbook.
///
/// Each table is handled independently: a broken template aborts only that
/// table, and validation messages are collected exhaustively so one
/// submission cycle surfaces every problem at once.
#[derive(Debug)]
pub struct Pipeline {
    configs: OrderMap<String, TableConfig>,
}

impl Pipeline {
    /// Builds a pipeline, validating the configuration set up front.
    pub fn new(configs: OrderMap<String, TableConfig>) -> Result<Self, PipelineError> {
        for config in configs.values() {
            config.validate().map_err(PipelineError::ConfigValidation)?;
        }
        Ok(Pipeline { configs })
    }

    pub fn run(&self, workbook: &Workbook) -> PipelineOutcome {
        info!("Starting extraction of {} table(s)", self.configs.len());
        let extractor = TableExtractor::new(workbook);
        let mut outcome = PipelineOutcome::default();

        for (table_name, config) in &self.configs {
            match Self::run_table(&extractor, table_name, config) {
                Ok(Some(data_frame)) => {
                    outcome.tables.insert(table_name.clone(), data_frame);
                }
                Ok(None) => {}
                Err(PipelineError::Validation(validation_errors)) => {
                    for error in &validation_errors.errors {
                        info!(
                            "{} {}: {}",
                            config.extract.worksheet_name,
                            error.cell.map(|c| c.str_ref()).unwrap_or_default(),
                            error.message
                        );
                        outcome.error_messages.push(Message {
                            sheet: config.extract.worksheet_name.clone(),
                            section: table_name.clone(),
                            cell_index: error.cell.map(|c| c.str_ref()),
                            description: error.message.clone(),
                        });
                    }
                }
                Err(error) => {
                    warn!("Table {table_name} failed: {error}");
                    outcome.failed.insert(table_name.clone(), error);
                }
            }
        }

        info!(
            "Concluded run: {} table(s) extracted, {} validation message(s), {} hard failure(s)",
            outcome.tables.len(),
            outcome.error_messages.len(),
            outcome.failed.len()
        );
        outcome
    }

    fn run_table(
        extractor: &TableExtractor,
        table_name: &str,
        config: &TableConfig,
    ) -> Result<Option<DataFrame>, PipelineError> {
        let tables =
            extractor.extract(&config.extract.worksheet_name, &config.extract.id_tag)?;
        if tables.len() > 1 {
            // Current templates carry one instance per tag; keep the rest visible.
            warn!(
                "Table {table_name} has {} instances; only the first is ingested",
                tables.len()
            );
        }
        let table = tables
            .into_iter()
            .next()
            .expect("extraction yields at least one table");

        let processor = TableProcessor::new(config.process.clone());
        let Some(table) = processor.process(table)? else {
            info!("Table {table_name} is empty after processing");
            return Ok(None);
        };

        let validator = TableValidator::new(config.validate.clone());
        validator.validate(&table)?;

        Ok(Some(table.into_data_frame()?))
    }
}
