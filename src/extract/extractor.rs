use crate::extract::error::ExtractionError;
use crate::extract::tags::{find_tags, pair_tags};
use crate::extract::workbook::{Sheet, Workbook};
use crate::table::{Cell, CellValue, Table};
use log::debug;

/// Extracts tables from a workbook based on their id tags.
///
/// Tables are delimited in the source template by a start tag (`"{id}S"`)
/// placed one row above the table's top-left cell and an end tag (`"{id}E"`)
/// placed one row below its bottom-right cell. Every matching tag pair on the
/// worksheet yields one `Table`.
///
/// Example usage:
/// ```ignore
/// let extractor = TableExtractor::new(&workbook);
/// let tables = extractor.extract("Project progress", "PROJECT-PROGRESS")?;
/// ```
pub struct TableExtractor<'a> {
    workbook: &'a Workbook,
}

impl<'a> TableExtractor<'a> {
    pub fn new(workbook: &'a Workbook) -> Self {
        TableExtractor { workbook }
    }

    /// Extracts every table instance tagged with `id_tag` from the named
    /// worksheet, in reading order.
    pub fn extract(
        &self,
        worksheet_name: &str,
        id_tag: &str,
    ) -> Result<Vec<Table>, ExtractionError> {
        let worksheet = self
            .workbook
            .sheet(worksheet_name)
            .ok_or_else(|| ExtractionError::WorksheetNotFound(worksheet_name.to_string()))?;

        let tags = find_tags(worksheet, id_tag)?;
        let paired_tags = pair_tags(&tags);
        debug!(
            "Found {} instance(s) of table {id_tag} in worksheet {worksheet_name}",
            paired_tags.len()
        );

        let tables = paired_tags
            .into_iter()
            .map(|(start_tag, end_tag)| {
                let grid = carve(worksheet, start_tag, end_tag);
                Table::new(
                    grid,
                    id_tag.to_string(),
                    worksheet_name.to_string(),
                    start_tag,
                )
            })
            .collect();
        Ok(tables)
    }
}

/// Carves the sub-grid strictly between a tag pair: rows below the start tag
/// and above the end tag, columns spanning the two tags inclusively. Rows
/// shorter than the carve width are padded with empty cells.
fn carve(worksheet: &Sheet, start_tag: Cell, end_tag: Cell) -> Vec<Vec<CellValue>> {
    (start_tag.row + 1..end_tag.row)
        .map(|row_idx| {
            let row = worksheet.get(row_idx).map_or(&[] as &[CellValue], Vec::as_slice);
            (start_tag.column..=end_tag.column)
                .map(|col_idx| row.get(col_idx).cloned().unwrap_or(CellValue::Empty))
                .collect()
        })
        .collect()
}
