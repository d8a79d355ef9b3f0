use serde::Serialize;

use crate::calc::{CellError, CellStage};
use crate::grouping::{PatternSource, Slot};
use crate::matrix::RangePattern;

/// Where the NIST reference ratio of a cell came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceSource {
    /// The NIST ratio table
    Table,
    /// Derived from a measured `NIST_` column of the workbook
    MeasuredColumn {
        /// Column header
        column: String,
    },
}

/// The NIST reference ratio a cell was normalised against
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NistReferenceUsed {
    /// Reference family
    pub pattern: RangePattern,
    /// Whether the family was derived from the sample or taken from the sample index
    pub pattern_source: PatternSource,
    /// Slot within the family
    pub slot: Slot,
    /// Reference ratio value
    pub value: f64,
    /// Table entry or measured column
    pub source: ReferenceSource,
}

/// Inputs of the Agilent conversion
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgilentInputs {
    /// Standard concentration from the compound index (nM)
    pub concentration_nm: f64,
    /// Response factor from the compound index
    pub response_factor: f64,
    /// Run-wide coefficient
    pub coefficient: f64,
}

/// Full derivation of one (compound, sample) cell.
///
/// Every field of the chain is always present; values that could not be
/// computed are `None` and the reason is in [`CalculationRecord::errors`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationRecord {
    /// Compound name as written in the workbook
    pub compound: String,
    /// Sample identifier
    pub sample: String,
    /// 1-based compound row position
    pub row_index: usize,
    /// Reference family resolved for the sample
    pub pattern: RangePattern,
    /// Whether the pattern was derived or taken from the sample index
    pub pattern_source: PatternSource,
    /// Slot resolved from the row position
    pub slot: Slot,
    /// Plate label from the sample index
    pub plate: Option<String>,
    /// Compound area
    pub source_area: Option<f64>,
    /// Declared internal standard
    pub istd_name: Option<String>,
    /// 1-based row position of the internal standard
    pub istd_row_index: Option<usize>,
    /// Whether the internal standard row exists in the workbook
    pub istd_found: bool,
    /// Internal standard area
    pub istd_area: Option<f64>,
    /// Compound area ÷ ISTD area
    pub ratio: Option<f64>,
    /// Reference ratio looked up for the NIST result
    pub nist_reference_used: Option<NistReferenceUsed>,
    /// ratio ÷ reference ratio
    pub nist_result: Option<f64>,
    /// Inputs of the Agilent conversion
    pub agilent_inputs: Option<AgilentInputs>,
    /// ratio × concentration × response factor × coefficient
    pub agilent_result: Option<f64>,
    /// Every failure of this cell, in derivation order
    pub errors: Vec<CellError>,
}

impl CalculationRecord {
    /// Empty record for a cell whose pattern and slot are resolved
    pub fn new(
        compound: impl Into<String>,
        sample: impl Into<String>,
        row_index: usize,
        pattern: RangePattern,
        pattern_source: PatternSource,
        slot: Slot,
    ) -> Self {
        Self {
            compound: compound.into(),
            sample: sample.into(),
            row_index,
            pattern,
            pattern_source,
            slot,
            plate: None,
            source_area: None,
            istd_name: None,
            istd_row_index: None,
            istd_found: false,
            istd_area: None,
            ratio: None,
            nist_reference_used: None,
            nist_result: None,
            agilent_inputs: None,
            agilent_result: None,
            errors: Vec::new(),
        }
    }

    /// True when any step failed
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// True when the ratio step failed
    pub fn ratio_failed(&self) -> bool {
        self.errors.iter().any(|e| e.stage() == CellStage::Ratio)
    }
}
