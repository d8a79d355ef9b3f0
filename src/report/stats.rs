use std::fmt;

use serde::Serialize;

use crate::grouping::SampleGroups;
use crate::ledger::CalculationLedger;
use crate::matrix::{AreaMatrix, RangePattern};

/// Summary counts of a completed run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    /// Compound rows evaluated
    pub compounds: usize,

    /// Sample columns evaluated
    pub samples: usize,

    /// Measured NIST columns in the workbook
    pub reference_columns: usize,

    /// Cells evaluated (compounds × samples)
    pub cells: usize,

    /// Cells with a NIST result
    pub nist_available: usize,

    /// Cells with an Agilent result
    pub agilent_available: usize,

    /// Cells with at least one error
    pub cells_with_errors: usize,

    /// Distinct patterns the samples were normalised against
    pub patterns: Vec<RangePattern>,
}

impl RunStats {
    /// Count results of a run
    pub fn collect(matrix: &AreaMatrix, groups: &SampleGroups, ledger: &CalculationLedger) -> Self {
        Self {
            compounds: matrix.compound_count(),
            samples: matrix.sample_count(),
            reference_columns: matrix.reference_columns().len(),
            cells: ledger.len(),
            nist_available: ledger.iter().filter(|r| r.nist_result.is_some()).count(),
            agilent_available: ledger.iter().filter(|r| r.agilent_result.is_some()).count(),
            cells_with_errors: ledger.cells_with_errors(),
            patterns: groups.patterns(),
        }
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let patterns: Vec<String> = self.patterns.iter().map(ToString::to_string).collect();
        write!(
            f,
            "Run: {} compounds x {} samples = {} cells, {} NIST results, {} Agilent results, {} cells with errors, patterns [{}]",
            self.compounds,
            self.samples,
            self.cells,
            self.nist_available,
            self.agilent_available,
            self.cells_with_errors,
            patterns.join(", ")
        )
    }
}
