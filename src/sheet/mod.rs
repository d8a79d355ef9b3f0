//! # Tabular input
//!
//! Every input of the engine (the raw-area workbook and the three reference
//! tables) arrives as a grid of cells. This module turns CSV/TSV files and
//! Excel worksheets into an in-memory [`RawSheet`] so the rest of the crate
//! never touches file formats.
//!
//! ```rust,no_run
//! use lipidcalc::sheet::read_sheet;
//!
//! let sheet = read_sheet("raw_areas.csv", None)?;
//! println!("{} rows, {} columns", sheet.rows.len(), sheet.header.len());
//! # Ok::<(), lipidcalc::sheet::SheetError>(())
//! ```

mod csv_source;
mod header;
#[cfg(feature = "xlsx")]
mod xlsx_source;

#[cfg(test)]
mod tests;

use std::path::Path;

pub use csv_source::{read_csv, read_csv_from_reader};
pub use header::{
    count_sample_identifiers, locate_header_row, locate_sample_header_row, HEADER_SCAN_ROWS,
};
#[cfg(feature = "xlsx")]
pub use xlsx_source::read_xlsx;

/// Tokens that spreadsheets use for "no value". They are read as missing, never as zero.
pub const MISSING_TOKENS: &[&str] = &["N/A", "NA", "#N/A", "NAN", "NULL"];

/// Errors that can occur while reading a table from disk
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    /// I/O error reading the file
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV/TSV parsing error
    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    /// Excel decoding error
    #[cfg(feature = "xlsx")]
    #[error("Excel parsing error: {0}")]
    ExcelError(#[from] calamine::Error),

    /// The requested worksheet does not exist
    #[error("Worksheet not found: {0}")]
    MissingWorksheet(String),

    /// The file extension is not a supported table format
    #[error("Unsupported table format: {0}")]
    UnsupportedFormat(String),

    /// The table has no header row
    #[error("Table is empty: {0}")]
    Empty(String),
}

/// A single cell as read from the source table
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    /// Blank cell
    Empty,
    /// Numeric cell
    Number(f64),
    /// Any other content, untrimmed
    Text(String),
}

impl RawCell {
    /// Build a cell from CSV text: blank text becomes [`RawCell::Empty`]
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            RawCell::Empty
        } else {
            RawCell::Text(text.to_string())
        }
    }

    /// True for blank cells and the spreadsheet "no value" tokens
    pub fn is_missing(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Number(_) => false,
            RawCell::Text(text) => {
                let trimmed = text.trim();
                trimmed.is_empty()
                    || MISSING_TOKENS
                        .iter()
                        .any(|token| trimmed.eq_ignore_ascii_case(token))
            }
        }
    }

    /// Cell content as trimmed text (numbers are formatted)
    pub fn as_text(&self) -> Option<String> {
        match self {
            RawCell::Empty => None,
            RawCell::Number(value) => Some(value.to_string()),
            RawCell::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }

    /// Cell content as a number. `Ok(None)` for missing cells, `Err` with the
    /// offending text when the cell is neither missing nor numeric.
    pub fn as_number(&self) -> Result<Option<f64>, String> {
        if self.is_missing() {
            return Ok(None);
        }
        match self {
            RawCell::Number(value) => Ok(Some(*value)),
            RawCell::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| text.trim().to_string()),
            RawCell::Empty => Ok(None),
        }
    }
}

static EMPTY_CELL: RawCell = RawCell::Empty;

/// An in-memory table: a header row plus data rows in file order
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    /// Source name used in error messages (file or worksheet name)
    pub name: String,
    /// Header cells, trimmed
    pub header: Vec<String>,
    /// Data rows in source order; rows may be shorter or longer than the header
    pub rows: Vec<Vec<RawCell>>,
}

impl RawSheet {
    /// Create a sheet from a header and rows
    pub fn new(name: impl Into<String>, header: Vec<String>, rows: Vec<Vec<RawCell>>) -> Self {
        Self {
            name: name.into(),
            header: header.into_iter().map(|h| h.trim().to_string()).collect(),
            rows,
        }
    }

    /// Build a sheet from a grid whose header row must still be located.
    ///
    /// Rows above the detected header (report titles, instrument banners) are dropped.
    pub fn from_grid(name: impl Into<String>, grid: Vec<Vec<RawCell>>) -> Result<Self, SheetError> {
        let name = name.into();
        let header_idx = locate_header_row(&grid).ok_or_else(|| SheetError::Empty(name.clone()))?;
        let mut rows = grid.into_iter().skip(header_idx);
        let header = rows
            .next()
            .ok_or_else(|| SheetError::Empty(name.clone()))?
            .iter()
            .map(|cell| cell.as_text().unwrap_or_default())
            .collect();
        Ok(Self::new(name, header, rows.collect()))
    }

    /// Copy of the sheet with data row `row` promoted to the header; rows above it are dropped
    pub fn promote_row(&self, row: usize) -> Self {
        let header = self
            .rows
            .get(row)
            .map(|cells| cells.iter().map(|cell| cell.as_text().unwrap_or_default()).collect())
            .unwrap_or_default();
        let rows = self.rows.iter().skip(row + 1).cloned().collect();
        Self::new(self.name.clone(), header, rows)
    }

    /// Position of the column whose header matches any alias (case-insensitive)
    pub fn column_index(&self, aliases: &[&str]) -> Option<usize> {
        self.header.iter().position(|h| {
            aliases
                .iter()
                .any(|alias| h.trim().eq_ignore_ascii_case(alias))
        })
    }

    /// Cell at (row, column), treating cells past the end of a short row as empty
    pub fn cell(&self, row: usize, column: usize) -> &RawCell {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(&EMPTY_CELL)
    }

    /// True when every cell of the row is missing
    pub fn is_blank_row(&self, row: usize) -> bool {
        self.rows
            .get(row)
            .map_or(true, |cells| cells.iter().all(RawCell::is_missing))
    }
}

/// Read a table from disk, choosing the reader from the file extension.
///
/// `.csv` and `.tsv`/`.txt` go through the CSV reader; `.xlsx`, `.xlsm` and
/// `.xls` go through calamine (requires the `xlsx` feature). `worksheet`
/// selects an Excel worksheet by name and is ignored for CSV input.
pub fn read_sheet<P: AsRef<Path>>(path: P, worksheet: Option<&str>) -> Result<RawSheet, SheetError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => read_csv(path, b','),
        "tsv" | "txt" => read_csv(path, b'\t'),
        #[cfg(feature = "xlsx")]
        "xlsx" | "xlsm" | "xls" => read_xlsx(path, worksheet),
        other => {
            let _ = worksheet;
            Err(SheetError::UnsupportedFormat(format!(
                "{} (extension '{}')",
                path.display(),
                other
            )))
        }
    }
}
