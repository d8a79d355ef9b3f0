//! # lipidcalc
//!
//! Calculation engine for targeted lipid chromatography: turns a workbook of
//! raw peak areas (compounds × samples) into NIST-normalised and
//! Agilent-style concentration tables, with a per-cell ledger explaining
//! every number.
//!
//! ## Pipeline
//!
//! 1. [`sheet`] reads CSV/TSV/Excel tables into memory
//! 2. [`reference`] loads the compound index, NIST ratio table and optional
//!    sample index into an immutable [`reference::ReferenceDataStore`]
//! 3. [`matrix`] validates the raw-area workbook into an [`matrix::AreaMatrix`],
//!    preserving row order
//! 4. [`grouping`] maps samples to reference patterns and rows to NIST slots
//! 5. [`calc`] computes ratio, NIST and Agilent results per cell
//! 6. [`ledger`] records the full derivation of every cell
//! 7. [`report`] shapes the ledger into result tables and writes them
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lipidcalc::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = ReferenceDataStore::load(
//!         &read_sheet("compound_index.csv", None)?,
//!         &read_sheet("nist_ratios.csv", None)?,
//!         None,
//!     )?;
//!     let matrix = AreaMatrix::from_workbook(&read_sheet("raw_areas.xlsx", None)?)?;
//!
//!     let run = CalculationEngine::new(&store, EngineSettings::default()).run(&matrix)?;
//!     let (nist, agilent) = run.tables();
//!     write_csv("nist.csv", &nist, &ExportSettings::default())?;
//!     write_csv("agilent.csv", &agilent, &ExportSettings::default())?;
//!
//!     let record = run.ledger().get("AcylCarnitine 10:0", "PH-HC_5701")?;
//!     println!("{}", record.breakdown());
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Problems with the inputs themselves (malformed workbook, unreadable or
//! incomplete reference tables, invalid coefficient) abort the run with a
//! [`error::RunError`] listing every issue found. Problems confined to one
//! cell (missing area, missing or zero ISTD, missing NIST reference) never
//! abort: the cell renders as unavailable and its ledger record says why.

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![allow(clippy::too_many_arguments)]

pub mod calc;
pub mod error;
pub mod grouping;
pub mod ledger;
pub mod matrix;
pub mod names;
pub mod reference;
pub mod report;
pub mod sheet;
pub mod validator;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::calc::{
        CalculationEngine, CalculationRun, CellError, EngineSettings, DEFAULT_COEFFICIENT,
    };
    pub use crate::error::{InputIssue, IssueLocation, RunError};
    pub use crate::grouping::{
        pattern_for_sample, slot_for_row, PatternSource, SampleGroupResolver, Slot, SlotLayout,
    };
    pub use crate::ledger::{
        Breakdown, CalculationLedger, CalculationRecord, FormulaStep, LedgerError, NistReferenceUsed,
    };
    pub use crate::matrix::{AreaMatrix, MalformedInputError, RangePattern, SampleId};
    pub use crate::reference::{
        Compound, MissingReferenceError, ReferenceDataError, ReferenceDataStore,
    };
    #[cfg(feature = "xlsx")]
    pub use crate::report::write_xlsx;
    pub use crate::report::{
        write_csv, ExportError, ExportSettings, ReportAssembler, ResultCell, ResultKind,
        ResultTable, RunStats,
    };
    pub use crate::sheet::{read_sheet, RawCell, RawSheet, SheetError};
    pub use crate::validator::{validate_inputs, ValidationReport};
}
