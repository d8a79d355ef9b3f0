//! Ratios of the measured NIST standard injections (`NIST_<pattern> (<slot>)`
//! workbook columns).

use std::collections::HashMap;

use log::{debug, warn};

use crate::grouping::Slot;
use crate::matrix::{AreaMatrix, RangePattern, ReferenceColumnId};
use crate::report::{ResultCell, ResultKind, ResultTable};

use super::RatioCalculator;

/// Compound ÷ ISTD ratios of every measured NIST column
#[derive(Debug, Clone, Default)]
pub struct MeasuredReferences {
    columns: Vec<ReferenceColumnId>,
    compounds: Vec<String>,
    /// `ratios[row][column]`
    ratios: Vec<Vec<Option<f64>>>,
    by_slot: HashMap<(RangePattern, u32), usize>,
}

impl MeasuredReferences {
    /// Compute the ratio of every compound row in every measured column
    pub fn compute(matrix: &AreaMatrix, calculator: &RatioCalculator<'_>) -> Self {
        let columns = matrix.reference_columns().to_vec();
        let mut by_slot = HashMap::new();
        for (i, column) in columns.iter().enumerate() {
            if by_slot.insert((column.pattern, column.slot), i).is_some() {
                warn!(
                    "Measured NIST column '{}' repeats pattern {} slot {}; the last one is used",
                    column.header, column.pattern, column.slot
                );
            }
        }

        let ratios = (0..matrix.compound_count())
            .map(|row| {
                (0..columns.len())
                    .map(|col| calculator.reference_ratio(row, col).value())
                    .collect()
            })
            .collect();

        if !columns.is_empty() {
            debug!("Computed ratios for {} measured NIST columns", columns.len());
        }

        Self {
            columns,
            compounds: matrix.compounds().to_vec(),
            ratios,
            by_slot,
        }
    }

    /// True when the workbook has no measured NIST column
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Measured columns in workbook order
    pub fn columns(&self) -> &[ReferenceColumnId] {
        &self.columns
    }

    /// Ratio of a compound row in a measured column
    pub fn ratio(&self, row: usize, column: usize) -> Option<f64> {
        self.ratios.get(row).and_then(|r| r.get(column)).copied().flatten()
    }

    /// Measured ratio of a compound row for a (pattern, slot), with its column
    pub fn lookup(&self, row: usize, pattern: RangePattern, slot: Slot) -> Option<(f64, &ReferenceColumnId)> {
        let column = *self.by_slot.get(&(pattern, slot.get()))?;
        let value = self.ratio(row, column)?;
        Some((value, &self.columns[column]))
    }

    /// The measured ratios as a result table (compounds × NIST columns)
    pub fn table(&self) -> ResultTable {
        let mut table = ResultTable::new(
            ResultKind::NistRatio,
            self.compounds.clone(),
            self.columns.iter().map(|c| c.header.clone()).collect(),
        );
        for (row, ratios) in self.ratios.iter().enumerate() {
            for (col, ratio) in ratios.iter().enumerate() {
                table.set(row, col, ResultCell::from(*ratio));
            }
        }
        table
    }
}
