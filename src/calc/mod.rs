//! # Calculation engine
//!
//! Evaluates every (compound, sample) cell of an [`AreaMatrix`] through the
//! fixed chain
//!
//! ```text
//! ratio   = Area(compound) ÷ Area(ISTD)                  same sample column
//! NIST    = ratio ÷ NIST reference ratio                 (pattern of sample, slot of row)
//! Agilent = ratio × Conc. (nM) × response factor × coefficient
//! ```
//!
//! Each cell is independent: its inputs are read-only and its only output
//! is its own [`CalculationRecord`]. A failing cell is recorded with a
//! [`CellError`] and never affects its neighbours. NIST and Agilent both
//! start from the ratio, so neither depends on the other: a missing NIST
//! reference leaves the Agilent result intact.
//!
//! ## Example
//!
//! ```rust,no_run
//! use lipidcalc::calc::{CalculationEngine, EngineSettings};
//! use lipidcalc::matrix::AreaMatrix;
//! use lipidcalc::reference::ReferenceDataStore;
//! use lipidcalc::sheet::read_sheet;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ReferenceDataStore::load(
//!     &read_sheet("compound_index.csv", None)?,
//!     &read_sheet("nist_ratios.csv", None)?,
//!     None,
//! )?;
//! let matrix = AreaMatrix::from_workbook(&read_sheet("raw_areas.csv", None)?)?;
//!
//! let run = CalculationEngine::new(&store, EngineSettings::default()).run(&matrix)?;
//! let (nist, agilent) = run.tables();
//! println!("{}", run.stats());
//! # let _ = (nist, agilent);
//! # Ok(())
//! # }
//! ```

mod agilent;
mod error;
mod measured;
mod nist;
mod ratio;


use log::{debug, info};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::RunError;
use crate::grouping::{SampleGroupResolver, SampleGroups, SlotLayout};
use crate::ledger::{CalculationLedger, CalculationRecord, CellIssue, RunInfo};
use crate::matrix::AreaMatrix;
use crate::reference::ReferenceDataStore;
use crate::report::{ReportAssembler, ResultTable, RunStats};
use crate::sheet::RawSheet;

pub use agilent::AgilentConverter;
pub use error::{CellError, CellStage};
pub use measured::MeasuredReferences;
pub use nist::NistNormalizer;
pub use ratio::{RatioCalculator, RatioMeasurement};

/// Agilent coefficient applied when none is configured
pub const DEFAULT_COEFFICIENT: f64 = 500.0;

/// Run-wide calculation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Multiplier of the Agilent conversion
    pub coefficient: f64,
    /// Row-to-slot assignment for NIST lookups
    pub slot_layout: SlotLayout,
    /// Use measured `NIST_` workbook columns when the ratio table lacks an entry
    pub derive_missing_references: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            coefficient: DEFAULT_COEFFICIENT,
            slot_layout: SlotLayout::default(),
            derive_missing_references: false,
        }
    }
}

impl EngineSettings {
    /// Settings with a custom coefficient
    pub fn with_coefficient(coefficient: f64) -> Self {
        Self {
            coefficient,
            ..Self::default()
        }
    }

    /// Reject a non-positive or non-finite coefficient and an empty slot layout
    pub fn validate(&self) -> Result<(), RunError> {
        if !(self.coefficient.is_finite() && self.coefficient > 0.0) {
            return Err(RunError::InvalidCoefficient(self.coefficient));
        }
        self.slot_layout.validate().map_err(RunError::InvalidSlotLayout)
    }
}

/// Evaluates area matrices against one reference data store
#[derive(Debug, Clone, Copy)]
pub struct CalculationEngine<'a> {
    store: &'a ReferenceDataStore,
    settings: EngineSettings,
}

struct CellPipeline<'a> {
    matrix: &'a AreaMatrix,
    store: &'a ReferenceDataStore,
    groups: &'a SampleGroups,
    layout: SlotLayout,
    ratios: RatioCalculator<'a>,
    normalizer: NistNormalizer<'a>,
    converter: AgilentConverter,
}

impl CellPipeline<'_> {
    fn evaluate_row(&self, row: usize) -> Vec<CalculationRecord> {
        (0..self.matrix.sample_count())
            .filter_map(|sample| self.evaluate(row, sample))
            .collect()
    }

    fn evaluate(&self, row: usize, sample: usize) -> Option<CalculationRecord> {
        let compound_name = self.matrix.compounds().get(row)?;
        let assignment = self.groups.get(sample)?;
        let row_index = row + 1;

        let mut record = CalculationRecord::new(
            compound_name.clone(),
            assignment.sample.clone(),
            row_index,
            assignment.pattern,
            assignment.source,
            self.layout.slot_for_row(row_index),
        );
        record.plate = assignment.plate.clone();

        self.ratios.ratio(row, sample).apply(&mut record);
        self.normalizer.normalize(&mut record);
        self.converter.convert(&mut record, self.store.compound(compound_name));
        Some(record)
    }
}

impl<'a> CalculationEngine<'a> {
    /// Engine over a loaded reference store
    pub fn new(store: &'a ReferenceDataStore, settings: EngineSettings) -> Self {
        Self { store, settings }
    }

    /// Settings of this engine
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Validate and evaluate a workbook sheet
    pub fn run_sheet(&self, sheet: &RawSheet) -> Result<CalculationRun, RunError> {
        let matrix = AreaMatrix::from_workbook(sheet)?;
        self.run(&matrix)
    }

    /// Evaluate every cell of the matrix.
    ///
    /// Fails only on invalid settings; per-cell problems are recorded in the
    /// ledger. Cells are appended to the ledger in row-major order whether or
    /// not the `parallel` feature is enabled.
    pub fn run(&self, matrix: &AreaMatrix) -> Result<CalculationRun, RunError> {
        self.settings.validate()?;

        info!(
            "Calculating {} compounds x {} samples (coefficient {})",
            matrix.compound_count(),
            matrix.sample_count(),
            self.settings.coefficient
        );

        let resolver = SampleGroupResolver::new(self.store, self.settings.slot_layout);
        let groups = resolver.resolve(matrix);
        let known = self.store.nist_patterns();
        for pattern in groups.patterns() {
            if !known.contains(&pattern) {
                debug!("Pattern {} has no entries in the NIST ratio table", pattern);
            }
        }

        let ratios = RatioCalculator::new(matrix, self.store);
        let measured = MeasuredReferences::compute(matrix, &ratios);
        let mut normalizer = NistNormalizer::new(resolver);
        if self.settings.derive_missing_references {
            normalizer = normalizer.with_fallback(&measured);
        }

        let pipeline = CellPipeline {
            matrix,
            store: self.store,
            groups: &groups,
            layout: self.settings.slot_layout,
            ratios,
            normalizer,
            converter: AgilentConverter::new(self.settings.coefficient),
        };

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<CalculationRecord>> = (0..matrix.compound_count())
            .into_par_iter()
            .map(|row| pipeline.evaluate_row(row))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<CalculationRecord>> = (0..matrix.compound_count())
            .map(|row| pipeline.evaluate_row(row))
            .collect();

        let mut ledger = CalculationLedger::new(RunInfo::new(
            self.settings.coefficient,
            self.settings.slot_layout,
            matrix.compound_count(),
            matrix.sample_count(),
        ));
        for record in rows.into_iter().flatten() {
            ledger.record(record)?;
        }

        info!(
            "Calculated {} cells, {} with errors",
            ledger.len(),
            ledger.cells_with_errors()
        );

        Ok(CalculationRun {
            matrix: matrix.clone(),
            groups,
            measured,
            ledger,
            settings: self.settings,
        })
    }
}

/// Everything one run produced: the ledger plus what is needed to render it
#[derive(Debug, Clone)]
pub struct CalculationRun {
    matrix: AreaMatrix,
    groups: SampleGroups,
    measured: MeasuredReferences,
    ledger: CalculationLedger,
    settings: EngineSettings,
}

impl CalculationRun {
    /// The evaluated matrix
    pub fn matrix(&self) -> &AreaMatrix {
        &self.matrix
    }

    /// Pattern assignment of every sample column
    pub fn groups(&self) -> &SampleGroups {
        &self.groups
    }

    /// Ratios of the measured NIST columns
    pub fn measured(&self) -> &MeasuredReferences {
        &self.measured
    }

    /// Per-cell audit trail
    pub fn ledger(&self) -> &CalculationLedger {
        &self.ledger
    }

    /// Settings the run used
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Every cell error of the run
    pub fn issues(&self) -> Vec<CellIssue> {
        self.ledger.issues()
    }

    /// The NIST and Agilent result tables
    pub fn tables(&self) -> (ResultTable, ResultTable) {
        ReportAssembler::new(&self.matrix, &self.ledger).build()
    }

    /// Measured NIST column ratios, when the workbook has such columns
    pub fn nist_ratio_table(&self) -> Option<ResultTable> {
        (!self.measured.is_empty()).then(|| self.measured.table())
    }

    /// Summary counts
    pub fn stats(&self) -> RunStats {
        RunStats::collect(&self.matrix, &self.groups, &self.ledger)
    }
}
