use std::collections::HashMap;

use serde::Serialize;

use crate::error::{InputIssue, IssueLocation};
use crate::matrix::RangePattern;
use crate::sheet::RawSheet;

use super::compound::require_column;

const TABLE: &str = "sample index";

const SAMPLE_COLUMN: &[&str] = &["sample", "sample_name", "sample name", "sample_id"];
const PATTERN_COLUMN: &[&str] = &["pattern", "range_pattern", "range"];
const PLATE_COLUMN: &[&str] = &["plate", "plate_group", "plate group", "group"];

/// Declared metadata for one sample
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SampleIndexEntry {
    /// Pattern replacing the one derived from the numeric suffix
    pub pattern: Option<RangePattern>,
    /// Plate or group label
    pub plate: Option<String>,
}

pub(crate) fn parse_sample_index(
    sheet: &RawSheet,
    structural: &mut Vec<InputIssue>,
) -> HashMap<String, SampleIndexEntry> {
    let mut entries = HashMap::new();

    let Some(sample_col) = require_column(sheet, TABLE, SAMPLE_COLUMN, "sample", structural) else {
        return entries;
    };
    let pattern_col = sheet.column_index(PATTERN_COLUMN);
    let plate_col = sheet.column_index(PLATE_COLUMN);

    for row in 0..sheet.rows.len() {
        if sheet.is_blank_row(row) {
            continue;
        }
        let at = |column: usize| {
            IssueLocation::table(TABLE)
                .row(row + 1)
                .column(sheet.header[column].clone())
        };

        let Some(sample) = sheet.cell(row, sample_col).as_text() else {
            structural.push(InputIssue::new(at(sample_col), "sample name is empty"));
            continue;
        };

        let pattern = match pattern_col.and_then(|c| sheet.cell(row, c).as_text().map(|t| (c, t))) {
            Some((c, text)) => match text.parse::<RangePattern>() {
                Ok(p) => Some(p),
                Err(message) => {
                    structural.push(InputIssue::new(at(c), message));
                    continue;
                }
            },
            None => None,
        };
        let plate = plate_col.and_then(|c| sheet.cell(row, c).as_text());

        if entries.contains_key(&sample) {
            structural.push(InputIssue::new(
                at(sample_col),
                format!("duplicate sample '{}'", sample),
            ));
            continue;
        }
        entries.insert(sample, SampleIndexEntry { pattern, plate });
    }

    entries
}
