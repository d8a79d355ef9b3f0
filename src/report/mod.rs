//! # Result tables
//!
//! Shapes ledger records into the two compound × sample output tables
//! (NIST-normalised and Agilent concentrations) and writes them to disk.
//! Row order is the workbook's compound order and column order its sample
//! order. Cells whose value could not be computed are
//! [`ResultCell::Unavailable`], never zero.

mod export;
mod stats;

#[cfg(test)]
mod tests;

use serde::Serialize;

use crate::ledger::{CalculationLedger, CalculationRecord};
use crate::matrix::AreaMatrix;

#[cfg(feature = "xlsx")]
pub use export::write_xlsx;
pub use export::{write_csv, write_csv_to, ExportError, ExportSettings, DEFAULT_UNAVAILABLE_MARKER};
pub use stats::RunStats;

/// Which quantity a result table holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// ratio ÷ NIST reference ratio
    Nist,
    /// ratio × concentration × response factor × coefficient
    Agilent,
    /// Compound ÷ ISTD ratios of the measured NIST columns
    NistRatio,
}

impl ResultKind {
    /// Worksheet name used on export
    pub fn sheet_name(&self) -> &'static str {
        match self {
            ResultKind::Nist => "NIST Results",
            ResultKind::Agilent => "Agilent Results",
            ResultKind::NistRatio => "NIST Ratios",
        }
    }

    /// Short name used in file names and log lines
    pub fn short_name(&self) -> &'static str {
        match self {
            ResultKind::Nist => "nist",
            ResultKind::Agilent => "agilent",
            ResultKind::NistRatio => "nist_ratios",
        }
    }
}

/// One cell of a result table
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultCell {
    /// Computed value
    Value(f64),
    /// Not computable; the ledger records why
    Unavailable,
}

impl ResultCell {
    /// The value, if available
    pub fn value(&self) -> Option<f64> {
        match self {
            ResultCell::Value(v) => Some(*v),
            ResultCell::Unavailable => None,
        }
    }

    /// True for [`ResultCell::Unavailable`]
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ResultCell::Unavailable)
    }
}

impl From<Option<f64>> for ResultCell {
    fn from(value: Option<f64>) -> Self {
        value.map_or(ResultCell::Unavailable, ResultCell::Value)
    }
}

/// Compound × column table of results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultTable {
    /// Quantity held by the table
    pub kind: ResultKind,
    /// Compound names, workbook order
    pub compounds: Vec<String>,
    /// Column headers (sample identifiers or NIST column headers), workbook order
    pub columns: Vec<String>,
    /// `cells[row][column]`
    pub cells: Vec<Vec<ResultCell>>,
}

impl ResultTable {
    /// Table of the given shape with every cell unavailable
    pub fn new(kind: ResultKind, compounds: Vec<String>, columns: Vec<String>) -> Self {
        let cells = vec![vec![ResultCell::Unavailable; columns.len()]; compounds.len()];
        Self {
            kind,
            compounds,
            columns,
            cells,
        }
    }

    /// Cell at (row, column); out-of-range positions are unavailable
    pub fn get(&self, row: usize, column: usize) -> ResultCell {
        self.cells
            .get(row)
            .and_then(|r| r.get(column))
            .copied()
            .unwrap_or(ResultCell::Unavailable)
    }

    /// Cell addressed by compound name and column header
    pub fn lookup(&self, compound: &str, column: &str) -> Option<ResultCell> {
        let row = self.compounds.iter().position(|c| c == compound)?;
        let col = self.columns.iter().position(|c| c == column)?;
        Some(self.get(row, col))
    }

    /// Overwrite a cell; out-of-range positions are ignored
    pub fn set(&mut self, row: usize, column: usize, cell: ResultCell) {
        if let Some(slot) = self.cells.get_mut(row).and_then(|r| r.get_mut(column)) {
            *slot = cell;
        }
    }

    /// Number of cells holding a value
    pub fn available_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|c| !c.is_unavailable())
            .count()
    }
}

/// Builds the NIST and Agilent tables from a ledger
#[derive(Debug, Clone, Copy)]
pub struct ReportAssembler<'a> {
    matrix: &'a AreaMatrix,
    ledger: &'a CalculationLedger,
}

impl<'a> ReportAssembler<'a> {
    /// Assembler for one run
    pub fn new(matrix: &'a AreaMatrix, ledger: &'a CalculationLedger) -> Self {
        Self { matrix, ledger }
    }

    /// `(nist_table, agilent_table)`, both in workbook row and column order.
    ///
    /// A cell is unavailable when its result path failed: the NIST cell when
    /// the ratio or the reference lookup failed, the Agilent cell when the
    /// ratio failed.
    pub fn build(&self) -> (ResultTable, ResultTable) {
        (
            self.table(ResultKind::Nist, |r| r.nist_result),
            self.table(ResultKind::Agilent, |r| r.agilent_result),
        )
    }

    fn table(&self, kind: ResultKind, value: impl Fn(&CalculationRecord) -> Option<f64>) -> ResultTable {
        let compounds = self.matrix.compounds().to_vec();
        let samples: Vec<String> = self
            .matrix
            .samples()
            .iter()
            .map(|s| s.identifier.clone())
            .collect();
        let mut table = ResultTable::new(kind, compounds, samples);

        for (row, compound) in self.matrix.compounds().iter().enumerate() {
            for (col, sample) in self.matrix.samples().iter().enumerate() {
                let cell = self
                    .ledger
                    .get(compound, &sample.identifier)
                    .ok()
                    .and_then(&value);
                table.set(row, col, ResultCell::from(cell));
            }
        }
        table
    }
}
