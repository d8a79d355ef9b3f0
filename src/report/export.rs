//! CSV and Excel output of result tables.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use super::{ResultCell, ResultTable};

/// Text written for unavailable cells unless configured otherwise
pub const DEFAULT_UNAVAILABLE_MARKER: &str = "N/A";

/// Errors that can occur while writing result tables
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// CSV writing error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Excel writing error
    #[cfg(feature = "xlsx")]
    #[error("Excel error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),

    /// The table does not fit in a worksheet
    #[error("table '{0}' exceeds worksheet limits")]
    TooLarge(String),
}

/// How result tables are rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Text written for unavailable cells
    pub unavailable_marker: String,
    /// Add the measured NIST ratio sheet when the workbook has `NIST_` columns
    pub include_nist_ratio_sheet: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            unavailable_marker: DEFAULT_UNAVAILABLE_MARKER.to_string(),
            include_nist_ratio_sheet: true,
        }
    }
}

fn render(cell: ResultCell, settings: &ExportSettings) -> String {
    match cell {
        ResultCell::Value(value) => value.to_string(),
        ResultCell::Unavailable => settings.unavailable_marker.clone(),
    }
}

/// Write one table as CSV: a `Compound` column followed by one column per sample
pub fn write_csv_to<W: Write>(writer: W, table: &ResultTable, settings: &ExportSettings) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(table.columns.len() + 1);
    header.push("Compound".to_string());
    header.extend(table.columns.iter().cloned());
    csv_writer.write_record(&header)?;

    for (row, compound) in table.compounds.iter().enumerate() {
        let mut record = Vec::with_capacity(table.columns.len() + 1);
        record.push(compound.clone());
        record.extend((0..table.columns.len()).map(|col| render(table.get(row, col), settings)));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write one table to a CSV file
pub fn write_csv<P: AsRef<Path>>(path: P, table: &ResultTable, settings: &ExportSettings) -> Result<(), ExportError> {
    let path = path.as_ref();
    let file = File::create(path)?;
    write_csv_to(file, table, settings)?;
    info!("Wrote {} to {}", table.kind.sheet_name(), path.display());
    Ok(())
}

#[cfg(feature = "xlsx")]
fn build_workbook(tables: &[&ResultTable], settings: &ExportSettings) -> Result<rust_xlsxwriter::Workbook, ExportError> {
    use rust_xlsxwriter::{Color, Format, Workbook};

    use super::ResultKind;

    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    for table in tables {
        let too_large = || ExportError::TooLarge(table.kind.sheet_name().to_string());
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(table.kind.sheet_name())?;
        worksheet.set_tab_color(match table.kind {
            ResultKind::Nist => Color::RGB(0x0066CC),
            ResultKind::Agilent => Color::RGB(0xFF6600),
            ResultKind::NistRatio => Color::RGB(0x00CC66),
        });

        worksheet.write_string_with_format(0, 0, "Compound", &bold)?;
        for (col, header) in table.columns.iter().enumerate() {
            let col = u16::try_from(col + 1).map_err(|_| too_large())?;
            worksheet.write_string_with_format(0, col, header, &bold)?;
        }

        for (row, compound) in table.compounds.iter().enumerate() {
            let xl_row = u32::try_from(row + 1).map_err(|_| too_large())?;
            worksheet.write_string(xl_row, 0, compound)?;
            for col in 0..table.columns.len() {
                let xl_col = u16::try_from(col + 1).map_err(|_| too_large())?;
                match table.get(row, col) {
                    ResultCell::Value(value) => worksheet.write_number(xl_row, xl_col, value)?,
                    ResultCell::Unavailable => {
                        worksheet.write_string(xl_row, xl_col, &settings.unavailable_marker)?
                    }
                };
            }
        }

        worksheet.set_column_width(0, 28)?;
        worksheet.set_freeze_panes(1, 1)?;
    }

    Ok(workbook)
}

/// Write tables to one Excel workbook, one worksheet per table, in the given order
#[cfg(feature = "xlsx")]
pub fn write_xlsx<P: AsRef<Path>>(path: P, tables: &[&ResultTable], settings: &ExportSettings) -> Result<(), ExportError> {
    let path = path.as_ref();
    let mut workbook = build_workbook(tables, settings)?;
    workbook.save(path)?;
    info!("Wrote {} worksheet(s) to {}", tables.len(), path.display());
    Ok(())
}
