use calamine::XlsxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("No {0} tags found.")]
    TagsNotFound(String),
    #[error(
        "Unequal amount of start tags ({start_count}) and end tags ({end_count}) for table id {id_tag}"
    )]
    UnmatchedTags {
        id_tag: String,
        start_count: usize,
        end_count: usize,
    },
    #[error("Worksheet '{0}' not found in workbook.")]
    WorksheetNotFound(String),
    #[error(transparent)]
    Calamine(#[from] XlsxError),
}
