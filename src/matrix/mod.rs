//! # Raw area matrix
//!
//! In-memory form of the uploaded raw-area workbook: one row per compound in
//! file order, one column per sample identifier, cells holding instrument
//! peak areas. Row order is part of the data. The 1-based position of a
//! compound selects its NIST slot, so rows are never sorted or deduplicated
//! away.
//!
//! Columns named `NIST_<start>-<end> (<slot>)` are measured NIST standard
//! injections rather than samples; they are kept apart in
//! [`AreaMatrix::reference_columns`].

mod error;
mod sample;


use std::collections::HashMap;

use log::{debug, warn};

use crate::error::{InputIssue, IssueLocation};
use crate::names::canonical_key;
use crate::sheet::{locate_sample_header_row, RawCell, RawSheet};

pub use error::MalformedInputError;
pub use sample::{
    RangePattern, ReferenceColumnId, SampleId, NIST_COLUMN_PREFIX, RANGE_BLOCK_WIDTH,
};

const TABLE: &str = "workbook";

enum ColumnKind {
    Sample(usize),
    Reference(usize),
    Ignored,
}

/// Compound × sample grid of raw peak areas
#[derive(Debug, Clone)]
pub struct AreaMatrix {
    compounds: Vec<String>,
    samples: Vec<SampleId>,
    reference_columns: Vec<ReferenceColumnId>,
    /// `areas[row][sample]`, `None` for missing cells
    areas: Vec<Vec<Option<f64>>>,
    /// `reference_areas[row][reference column]`
    reference_areas: Vec<Vec<Option<f64>>>,
    rows_by_name: HashMap<String, usize>,
    rows_by_key: HashMap<String, usize>,
    skipped_blank_rows: usize,
}

impl AreaMatrix {
    /// Validate a workbook sheet and build the matrix.
    ///
    /// The first column holds compound names (non-empty, unique). Every other
    /// column must be a `<cohort>_<digits>` sample identifier or a
    /// `NIST_<pattern> (<slot>)` reference column. Cells must be non-negative
    /// numbers or blank; blank cells are missing, not zero. Entirely blank rows
    /// are skipped and do not take a row position.
    ///
    /// When the header row carries no sample identifier (for example a title
    /// line whose first cell is not a compound keyword), the first row with at
    /// least two sample identifiers is promoted to the header.
    pub fn from_workbook(sheet: &RawSheet) -> Result<Self, MalformedInputError> {
        let promoted;
        let sheet = match sample_header_row(sheet) {
            Some(row) => {
                debug!("Header of {} found at data row {}", sheet.name, row + 1);
                promoted = sheet.promote_row(row);
                &promoted
            }
            None => sheet,
        };

        let mut issues = Vec::new();

        if sheet.header.is_empty() {
            issues.push(InputIssue::new(
                IssueLocation::table(TABLE),
                "workbook has no header row",
            ));
            return Err(MalformedInputError { issues });
        }

        let compound_header = &sheet.header[0];
        if !compound_header.eq_ignore_ascii_case("compound") {
            debug!(
                "Using first column '{}' of {} as the compound column",
                compound_header, sheet.name
            );
        }

        let mut samples: Vec<SampleId> = Vec::new();
        let mut reference_columns: Vec<ReferenceColumnId> = Vec::new();
        let mut kinds = Vec::with_capacity(sheet.header.len());
        let mut seen_headers: HashMap<&str, usize> = HashMap::new();

        for (col, header) in sheet.header.iter().enumerate().skip(1) {
            if header.is_empty() {
                let has_data = (0..sheet.rows.len()).any(|r| !sheet.cell(r, col).is_missing());
                if has_data {
                    issues.push(InputIssue::new(
                        IssueLocation::table(TABLE).column(format!("#{}", col + 1)),
                        "column has values but no header",
                    ));
                }
                kinds.push(ColumnKind::Ignored);
                continue;
            }

            if let Some(first) = seen_headers.insert(header.as_str(), col) {
                issues.push(InputIssue::new(
                    IssueLocation::table(TABLE).column(header.clone()),
                    format!(
                        "duplicate column header (first seen in column #{})",
                        first + 1
                    ),
                ));
                kinds.push(ColumnKind::Ignored);
                continue;
            }

            if let Some(sample) = SampleId::parse(header) {
                kinds.push(ColumnKind::Sample(samples.len()));
                samples.push(sample);
            } else if let Some(reference) = ReferenceColumnId::parse(header) {
                kinds.push(ColumnKind::Reference(reference_columns.len()));
                reference_columns.push(reference);
            } else if SampleId::has_oversized_suffix(header) {
                issues.push(InputIssue::new(
                    IssueLocation::table(TABLE).column(header.clone()),
                    "sample identifier suffix is too large to assign a range block",
                ));
                kinds.push(ColumnKind::Ignored);
            } else {
                issues.push(InputIssue::new(
                    IssueLocation::table(TABLE).column(header.clone()),
                    "column header is not a sample identifier of the form <cohort>_<digits>",
                ));
                kinds.push(ColumnKind::Ignored);
            }
        }

        if samples.is_empty() && issues.is_empty() {
            issues.push(InputIssue::new(
                IssueLocation::table(TABLE),
                "workbook has no sample columns",
            ));
        }

        let mut compounds = Vec::new();
        let mut areas = Vec::new();
        let mut reference_areas = Vec::new();
        let mut rows_by_name: HashMap<String, usize> = HashMap::new();
        let mut rows_by_key: HashMap<String, usize> = HashMap::new();
        let mut skipped_blank_rows = 0;

        for row in 0..sheet.rows.len() {
            let data_row = row + 1;
            if sheet.is_blank_row(row) {
                skipped_blank_rows += 1;
                continue;
            }

            let name = match sheet.cell(row, 0).as_text() {
                Some(name) => name,
                None => {
                    issues.push(InputIssue::new(
                        IssueLocation::table(TABLE).row(data_row).column(compound_header.clone()),
                        "compound name is empty",
                    ));
                    continue;
                }
            };

            if let Some(&first) = rows_by_name.get(&name) {
                issues.push(InputIssue::new(
                    IssueLocation::table(TABLE).row(data_row).column(compound_header.clone()),
                    format!(
                        "duplicate compound name '{}' (first seen at compound row {})",
                        name,
                        first + 1
                    ),
                ));
                continue;
            }

            let mut sample_cells = vec![None; samples.len()];
            let mut reference_cells = vec![None; reference_columns.len()];

            for (offset, kind) in kinds.iter().enumerate() {
                let col = offset + 1;
                let target = match kind {
                    ColumnKind::Sample(i) => &mut sample_cells[*i],
                    ColumnKind::Reference(i) => &mut reference_cells[*i],
                    ColumnKind::Ignored => continue,
                };
                match parse_area(sheet.cell(row, col)) {
                    Ok(value) => *target = value,
                    Err(message) => issues.push(InputIssue::new(
                        IssueLocation::table(TABLE)
                            .row(data_row)
                            .column(sheet.header[col].clone()),
                        message,
                    )),
                }
            }

            if let Some(cells) = sheet.rows.get(row) {
                for extra in cells.iter().skip(sheet.header.len()) {
                    if !extra.is_missing() {
                        issues.push(InputIssue::new(
                            IssueLocation::table(TABLE).row(data_row),
                            "value found beyond the last header column",
                        ));
                        break;
                    }
                }
            }

            let position = compounds.len();
            rows_by_key.entry(canonical_key(&name)).or_insert(position);
            rows_by_name.insert(name.clone(), position);
            compounds.push(name);
            areas.push(sample_cells);
            reference_areas.push(reference_cells);
        }

        if compounds.is_empty() && issues.is_empty() {
            issues.push(InputIssue::new(
                IssueLocation::table(TABLE),
                "workbook has no compound rows",
            ));
        }

        if !issues.is_empty() {
            return Err(MalformedInputError { issues });
        }

        if skipped_blank_rows > 0 {
            warn!(
                "Skipped {} blank row(s) in {}; they do not take a row position",
                skipped_blank_rows, sheet.name
            );
        }
        debug!(
            "Area matrix: {} compounds x {} samples ({} NIST reference columns)",
            compounds.len(),
            samples.len(),
            reference_columns.len()
        );

        Ok(Self {
            compounds,
            samples,
            reference_columns,
            areas,
            reference_areas,
            rows_by_name,
            rows_by_key,
            skipped_blank_rows,
        })
    }

    /// Compound names in file order
    pub fn compounds(&self) -> &[String] {
        &self.compounds
    }

    /// Sample columns in file order
    pub fn samples(&self) -> &[SampleId] {
        &self.samples
    }

    /// Measured NIST standard columns in file order
    pub fn reference_columns(&self) -> &[ReferenceColumnId] {
        &self.reference_columns
    }

    /// Number of compound rows
    pub fn compound_count(&self) -> usize {
        self.compounds.len()
    }

    /// Number of sample columns
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Number of blank rows dropped while reading
    pub fn skipped_blank_rows(&self) -> usize {
        self.skipped_blank_rows
    }

    /// 0-based position of a compound row: exact name first, then canonical key
    pub fn find_row(&self, compound: &str) -> Option<usize> {
        self.rows_by_name
            .get(compound)
            .or_else(|| self.rows_by_key.get(&canonical_key(compound)))
            .copied()
    }

    /// 0-based position of a sample column
    pub fn find_sample(&self, identifier: &str) -> Option<usize> {
        let identifier = identifier.trim();
        self.samples.iter().position(|s| s.identifier == identifier)
    }

    /// Raw area at (row, sample), `None` when missing or out of range
    pub fn area(&self, row: usize, sample: usize) -> Option<f64> {
        self.areas.get(row).and_then(|cells| cells.get(sample)).copied().flatten()
    }

    /// Raw area of a measured NIST column at (row, reference column)
    pub fn reference_area(&self, row: usize, column: usize) -> Option<f64> {
        self.reference_areas
            .get(row)
            .and_then(|cells| cells.get(column))
            .copied()
            .flatten()
    }

    /// Raw area addressed by names
    pub fn area_by_name(&self, compound: &str, sample: &str) -> Option<f64> {
        let row = self.find_row(compound)?;
        let col = self.find_sample(sample)?;
        self.area(row, col)
    }
}

fn sample_header_row(sheet: &RawSheet) -> Option<usize> {
    let has_sample_columns = sheet
        .header
        .iter()
        .any(|h| SampleId::parse(h).is_some() || ReferenceColumnId::parse(h).is_some());
    if has_sample_columns {
        return None;
    }
    locate_sample_header_row(&sheet.rows)
}

fn parse_area(cell: &RawCell) -> Result<Option<f64>, String> {
    match cell.as_number() {
        Ok(None) => Ok(None),
        Ok(Some(value)) if !value.is_finite() => Err(format!("area {} is not finite", value)),
        Ok(Some(value)) if value < 0.0 => Err(format!("area {} is negative", value)),
        Ok(Some(value)) => Ok(Some(value)),
        Err(text) => Err(format!("'{}' is not a number", text)),
    }
}
