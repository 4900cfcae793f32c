use crate::extract::error::ExtractionError;
use crate::process::error::ProcessingError;
use crate::validate::error::TableValidationErrors;
use polars::prelude::PolarsError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Processing(#[from] ProcessingError),
    #[error(transparent)]
    Validation(#[from] TableValidationErrors),
    #[error(transparent)]
    ConfigValidation(#[from] ValidationErrors),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}
