use serde::Serialize;

use crate::grouping::Slot;
use crate::matrix::RangePattern;
use crate::reference::MissingReferenceError;

/// Derivation step a cell error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellStage {
    /// Compound ÷ ISTD area; failure here leaves both results unavailable
    Ratio,
    /// NIST normalisation; failure here leaves only the NIST result unavailable
    Nist,
}

/// Recoverable failure of one (compound, sample) cell.
///
/// Cell errors are recorded in the ledger and render as "unavailable"; they
/// never abort the run.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellError {
    /// The workbook compound has no compound index entry
    #[error("compound '{compound}' is not in the compound index")]
    UnknownCompound {
        /// Workbook compound name
        compound: String,
    },

    /// The compound's own area is blank
    #[error("missing substance area")]
    MissingArea,

    /// The compound index entry names no internal standard
    #[error("no ISTD declared for compound '{compound}'")]
    IstdNotDeclared {
        /// Compound without an ISTD
        compound: String,
    },

    /// The declared internal standard has no row in the workbook
    #[error("ISTD row not found: '{istd}'")]
    MissingIstd {
        /// Declared ISTD name
        istd: String,
    },

    /// The internal standard's area is blank or exactly zero
    #[error("ISTD area is zero or missing for '{istd}'")]
    ZeroIstd {
        /// ISTD name
        istd: String,
        /// The zero area, or `None` when blank
        area: Option<f64>,
    },

    /// No NIST reference ratio for the resolved (pattern, slot)
    #[error("{0}")]
    MissingReference(MissingReferenceError),

    /// The NIST reference ratio is zero, negative or not finite
    #[error("invalid NIST reference ratio {value} for pattern {pattern} slot {slot}")]
    InvalidReference {
        /// Reference family
        pattern: RangePattern,
        /// Slot within the family
        slot: Slot,
        /// Offending reference value
        value: f64,
    },
}

impl CellError {
    /// Step of the derivation chain that failed
    pub fn stage(&self) -> CellStage {
        match self {
            CellError::MissingReference(_) | CellError::InvalidReference { .. } => CellStage::Nist,
            _ => CellStage::Ratio,
        }
    }
}
