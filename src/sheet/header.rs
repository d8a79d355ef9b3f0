use super::RawCell;
use crate::matrix::SampleId;

/// Number of leading rows searched for the header row
pub const HEADER_SCAN_ROWS: usize = 15;

const HEADER_KEYWORDS: &[&str] = &["compound", "name", "substance", "lipid", "metabolite", "sample"];

/// Find the header row of a grid.
///
/// Instrument exports often put a title or method line above the real header.
/// The header is the first row (within [`HEADER_SCAN_ROWS`]) whose first cell
/// names the compound or sample column. Otherwise the first non-blank row is
/// used. Workbook headers that start with neither are recovered later by
/// [`locate_sample_header_row`].
pub fn locate_header_row(grid: &[Vec<RawCell>]) -> Option<usize> {
    let scanned = grid.iter().take(HEADER_SCAN_ROWS).enumerate();
    for (idx, row) in scanned {
        let first = row.first().and_then(RawCell::as_text).unwrap_or_default();
        let first = first.to_lowercase();
        if HEADER_KEYWORDS.iter().any(|k| first.starts_with(k)) {
            return Some(idx);
        }
    }

    grid.iter()
        .position(|row| row.iter().any(|cell| !cell.is_missing()))
}

/// Number of cells in a row that read as `<cohort>_<digits>` sample identifiers
pub fn count_sample_identifiers(row: &[RawCell]) -> usize {
    row.iter()
        .filter_map(RawCell::as_text)
        .filter(|text| SampleId::parse(text).is_some())
        .count()
}

/// First row (within [`HEADER_SCAN_ROWS`]) carrying at least two sample identifiers.
///
/// Only meaningful for the raw-area workbook: reference tables hold sample
/// identifiers and `Plate_<n>` labels in their data rows.
pub fn locate_sample_header_row(rows: &[Vec<RawCell>]) -> Option<usize> {
    rows.iter()
        .take(HEADER_SCAN_ROWS)
        .position(|row| count_sample_identifiers(row) >= 2)
}
