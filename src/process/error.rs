use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Column(s) to drop missing from table - {0:?}")]
    ColumnsToDropMissing(Vec<String>),
}
