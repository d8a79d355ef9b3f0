use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use log::debug;

use super::{RawCell, RawSheet, SheetError};

/// Read one worksheet of an Excel workbook (the first one unless named)
pub fn read_xlsx<P: AsRef<Path>>(path: P, worksheet: Option<&str>) -> Result<RawSheet, SheetError> {
    let path = path.as_ref();
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = match worksheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(SheetError::MissingWorksheet(name.to_string()));
            }
            name.to_string()
        }
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| SheetError::Empty(path.display().to_string()))?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    debug!(
        "Read worksheet '{}' from {}: {:?} cells",
        sheet_name,
        path.display(),
        range.get_size()
    );

    let grid = range
        .rows()
        .map(|row| row.iter().map(data_to_cell).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    RawSheet::from_grid(sheet_name, grid)
}

fn data_to_cell(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Empty,
        Data::Int(v) => RawCell::Number(*v as f64),
        Data::Float(v) => RawCell::Number(*v),
        Data::String(v) => RawCell::from_text(v),
        Data::Bool(v) => RawCell::Text(v.to_string()),
        Data::DateTime(v) => RawCell::Number(v.as_f64()),
        Data::DateTimeIso(v) | Data::DurationIso(v) => RawCell::Text(v.clone()),
        // #N/A reads as missing; other formula errors fail area validation.
        Data::Error(e) => RawCell::Text(e.to_string()),
    }
}
