//! # Calculation ledger
//!
//! Append-only store of one [`CalculationRecord`] per (compound, sample)
//! cell. The ledger is the audit trail behind every number in the result
//! tables: each record carries the areas, ISTD, reference ratio, concentration,
//! response factor and coefficient that produced its results, plus any cell
//! errors. Records are never replaced once written.
//!
//! ## Example
//!
//! ```rust,no_run
//! # fn demo(ledger: &lipidcalc::ledger::CalculationLedger) -> Result<(), lipidcalc::ledger::LedgerError> {
//! let record = ledger.get("AcylCarnitine 10:0", "PH-HC_5712")?;
//! println!("{}", record.breakdown());
//! # Ok(())
//! # }
//! ```

mod breakdown;
mod error;
mod record;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::calc::CellError;
use crate::grouping::SlotLayout;

pub use breakdown::{Breakdown, FormulaStep};
pub use error::LedgerError;
pub use record::{AgilentInputs, CalculationRecord, NistReferenceUsed, ReferenceSource};

/// Identity and settings of the run that produced a ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunInfo {
    /// Unique run identifier
    pub run_id: Uuid,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Agilent coefficient applied to every cell
    pub coefficient: f64,
    /// Row-to-slot layout used for NIST lookups
    pub slot_layout: SlotLayout,
    /// Compound rows in the workbook
    pub compounds: usize,
    /// Sample columns in the workbook
    pub samples: usize,
}

impl RunInfo {
    /// Run metadata stamped with a fresh identifier and the current time
    pub fn new(coefficient: f64, slot_layout: SlotLayout, compounds: usize, samples: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            coefficient,
            slot_layout,
            compounds,
            samples,
        }
    }
}

/// A cell error addressed by compound and sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellIssue {
    /// Compound name
    pub compound: String,
    /// Sample identifier
    pub sample: String,
    /// 1-based compound row position
    pub row_index: usize,
    /// What went wrong
    pub error: CellError,
}

/// Append-only per-cell audit trail of one run
#[derive(Debug, Clone)]
pub struct CalculationLedger {
    info: RunInfo,
    records: Vec<CalculationRecord>,
    index: HashMap<String, HashMap<String, usize>>,
}

#[derive(Serialize)]
struct LedgerEntry<'a> {
    #[serde(flatten)]
    record: &'a CalculationRecord,
    breakdown: Vec<FormulaStep>,
}

#[derive(Serialize)]
struct LedgerDocument<'a> {
    run: &'a RunInfo,
    records: Vec<LedgerEntry<'a>>,
    issues: Vec<CellIssue>,
}

impl CalculationLedger {
    /// Empty ledger for a run
    pub fn new(info: RunInfo) -> Self {
        Self {
            info,
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Run metadata
    pub fn info(&self) -> &RunInfo {
        &self.info
    }

    /// Append a record; a second record for the same cell is rejected
    pub fn record(&mut self, record: CalculationRecord) -> Result<(), LedgerError> {
        let by_sample = self.index.entry(record.compound.clone()).or_default();
        if by_sample.contains_key(&record.sample) {
            return Err(LedgerError::Duplicate {
                compound: record.compound,
                sample: record.sample,
            });
        }
        by_sample.insert(record.sample.clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Record for a cell
    pub fn get(&self, compound: &str, sample: &str) -> Result<&CalculationRecord, LedgerError> {
        self.index
            .get(compound)
            .and_then(|by_sample| by_sample.get(sample))
            .and_then(|&i| self.records.get(i))
            .ok_or_else(|| LedgerError::NotFound {
                compound: compound.to_string(),
                sample: sample.to_string(),
            })
    }

    /// Records in insertion order (row-major)
    pub fn iter(&self) -> impl Iterator<Item = &CalculationRecord> {
        self.records.iter()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no record has been written
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every cell error of the run, row-major
    pub fn issues(&self) -> Vec<CellIssue> {
        self.records
            .iter()
            .flat_map(|record| {
                record.errors.iter().map(move |error| CellIssue {
                    compound: record.compound.clone(),
                    sample: record.sample.clone(),
                    row_index: record.row_index,
                    error: error.clone(),
                })
            })
            .collect()
    }

    /// Number of cells with at least one error
    pub fn cells_with_errors(&self) -> usize {
        self.records.iter().filter(|r| r.has_errors()).count()
    }

    /// Write the ledger (run metadata, records with breakdowns, issues) as pretty JSON
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), LedgerError> {
        let document = LedgerDocument {
            run: &self.info,
            records: self
                .records
                .iter()
                .map(|record| LedgerEntry {
                    record,
                    breakdown: record.breakdown().steps,
                })
                .collect(),
            issues: self.issues(),
        };
        serde_json::to_writer_pretty(writer, &document)?;
        Ok(())
    }

    /// The ledger as a pretty JSON string
    pub fn to_json(&self) -> Result<String, LedgerError> {
        let mut buffer = Vec::new();
        self.write_json(&mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl<'a> IntoIterator for &'a CalculationLedger {
    type Item = &'a CalculationRecord;
    type IntoIter = std::slice::Iter<'a, CalculationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
