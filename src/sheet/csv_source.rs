use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::{RawCell, RawSheet, SheetError};

/// Read a delimited text table from a file
pub fn read_csv<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<RawSheet, SheetError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    read_csv_from_reader(BufReader::new(file), delimiter, name)
}

/// Read a delimited text table from any reader.
///
/// The header row is located with the same rules as Excel input, so exports
/// that carry a title line above the header are accepted.
pub fn read_csv_from_reader<R: Read>(
    reader: R,
    delimiter: u8,
    name: impl Into<String>,
) -> Result<RawSheet, SheetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .has_headers(false)
        .from_reader(reader);

    let mut grid = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        grid.push(record.iter().map(RawCell::from_text).collect::<Vec<_>>());
    }

    RawSheet::from_grid(name, grid)
}
