use crate::extract::error::ExtractionError;
use crate::extract::workbook::Sheet;
use crate::table::Cell;

/// Whether a located tag opens or closes a table region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Start,
    End,
}

/// A tag cell located in a worksheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    pub cell: Cell,
    pub kind: TagKind,
}

pub(crate) fn start_tag(id_tag: &str) -> String {
    format!("{id_tag}S")
}

pub(crate) fn end_tag(id_tag: &str) -> String {
    format!("{id_tag}E")
}

/// Scans a worksheet for every start and end tag of the given table id.
///
/// Tags are matched by exact cell value. An id with no tags at all, or with
/// differing start and end counts, is a broken template and fails extraction
/// for that id.
pub(crate) fn find_tags(worksheet: &Sheet, id_tag: &str) -> Result<Vec<Tag>, ExtractionError> {
    let start = start_tag(id_tag);
    let end = end_tag(id_tag);

    let mut tags = Vec::new();
    for (row_idx, row) in worksheet.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let kind = match value.as_str() {
                Some(s) if s == start => TagKind::Start,
                Some(s) if s == end => TagKind::End,
                _ => continue,
            };
            tags.push(Tag {
                cell: Cell::new(row_idx, col_idx),
                kind,
            });
        }
    }

    if tags.is_empty() {
        return Err(ExtractionError::TagsNotFound(id_tag.to_string()));
    }

    let start_count = tags.iter().filter(|t| t.kind == TagKind::Start).count();
    let end_count = tags.len() - start_count;
    if start_count != end_count {
        return Err(ExtractionError::UnmatchedTags {
            id_tag: id_tag.to_string(),
            start_count,
            end_count,
        });
    }

    Ok(tags)
}

/// Pairs start and end tags positionally: both lists are sorted by
/// (row, column) and the i-th start is paired with the i-th end.
///
/// NOTE: this assumes tags are laid out in reading order. Templates with
/// interleaved tag pairs will be carved with wrong boundaries rather than
/// rejected; see DESIGN.md.
pub(crate) fn pair_tags(tags: &[Tag]) -> Vec<(Cell, Cell)> {
    let mut start_tags: Vec<Cell> = tags
        .iter()
        .filter(|t| t.kind == TagKind::Start)
        .map(|t| t.cell)
        .collect();
    let mut end_tags: Vec<Cell> = tags
        .iter()
        .filter(|t| t.kind == TagKind::End)
        .map(|t| t.cell)
        .collect();

    start_tags.sort_by_key(|c| (c.row, c.column));
    end_tags.sort_by_key(|c| (c.row, c.column));

    start_tags.into_iter().zip(end_tags).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;
    use rstest::rstest;

    fn sheet_with(values: &[(usize, usize, &str)]) -> Sheet {
        let n_rows = values.iter().map(|(r, _, _)| r + 1).max().unwrap_or(0);
        let n_cols = values.iter().map(|(_, c, _)| c + 1).max().unwrap_or(0);
        let mut sheet = vec![vec![CellValue::Empty; n_cols]; n_rows];
        for (row, col, value) in values {
            sheet[*row][*col] = CellValue::from(*value);
        }
        sheet
    }

    #[rstest]
    fn test_find_tags() {
        let sheet = sheet_with(&[(0, 1, "T1S"), (4, 3, "T1E"), (2, 2, "unrelated")]);
        let tags = find_tags(&sheet, "T1").unwrap();
        assert_eq!(
            tags,
            vec![
                Tag {
                    cell: Cell::new(0, 1),
                    kind: TagKind::Start
                },
                Tag {
                    cell: Cell::new(4, 3),
                    kind: TagKind::End
                },
            ]
        );
    }

    #[rstest]
    fn test_find_tags_ignores_other_ids() {
        let sheet = sheet_with(&[(0, 0, "T1S"), (2, 0, "T1E"), (0, 5, "T2S"), (2, 5, "T2E")]);
        let tags = find_tags(&sheet, "T1").unwrap();
        assert_eq!(tags.len(), 2);
        assert!(tags.iter().all(|t| t.cell.column == 0));
    }

    #[rstest]
    fn test_find_tags_none_found() {
        let sheet = sheet_with(&[(0, 0, "other")]);
        let result = find_tags(&sheet, "T1");
        assert!(matches!(result, Err(ExtractionError::TagsNotFound(id)) if id == "T1"));
    }

    #[rstest]
    fn test_find_tags_unmatched_counts() {
        let sheet = sheet_with(&[(0, 0, "T1S"), (3, 0, "T1S"), (5, 0, "T1E")]);
        let result = find_tags(&sheet, "T1");
        assert!(matches!(
            result,
            Err(ExtractionError::UnmatchedTags {
                start_count: 2,
                end_count: 1,
                ..
            })
        ));
    }

    #[rstest]
    fn test_pair_tags_in_reading_order() {
        let sheet = sheet_with(&[
            (0, 0, "T1S"),
            (3, 0, "T1E"),
            (5, 0, "T1S"),
            (8, 0, "T1E"),
        ]);
        let tags = find_tags(&sheet, "T1").unwrap();
        let pairs = pair_tags(&tags);
        assert_eq!(
            pairs,
            vec![
                (Cell::new(0, 0), Cell::new(3, 0)),
                (Cell::new(5, 0), Cell::new(8, 0)),
            ]
        );
    }

    #[rstest]
    fn test_pair_tags_side_by_side() {
        let sheet = sheet_with(&[
            (1, 0, "T1S"),
            (1, 4, "T1S"),
            (6, 2, "T1E"),
            (6, 6, "T1E"),
        ]);
        let tags = find_tags(&sheet, "T1").unwrap();
        let pairs = pair_tags(&tags);
        assert_eq!(
            pairs,
            vec![
                (Cell::new(1, 0), Cell::new(6, 2)),
                (Cell::new(1, 4), Cell::new(6, 6)),
            ]
        );
    }
}
