//! # Sample groups and NIST slots
//!
//! Two independent assignments decide which NIST reference ratio normalises a
//! cell:
//!
//! - every **sample column** maps to a reference *pattern*: the hundred-wide
//!   block around its numeric suffix (`PH-HC_5712` → `5700-5800`), unless the
//!   sample index overrides it;
//! - every **compound row** maps to a *slot* within the pattern by quartering
//!   its 1-based row index: rows 1–25 → slot 1, 26–50 → 2, 51–75 → 3,
//!   76–100 → 4, and row 101 starts over at slot 1.
//!
//! The row index is always passed in explicitly; nothing here depends on
//! iteration order.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::matrix::{AreaMatrix, RangePattern, SampleId};
use crate::reference::{MissingReferenceError, ReferenceDataStore, ReferenceRatio};

/// One of the reference-ratio variants within a pattern (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot(u32);

impl Slot {
    /// Create a slot; slot numbers start at 1
    pub fn new(number: u32) -> Option<Self> {
        (number >= 1).then_some(Self(number))
    }

    /// The 1-based slot number
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How compound rows are spread over the slots of a pattern.
///
/// The default (25 rows per slot, 4 slots) reproduces the documented
/// quartering of 100 compounds. Rows past one full cycle wrap to slot 1; that
/// wraparound has not been confirmed against reference tables with more than
/// 100 compounds, which is why the layout is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotLayout {
    /// Consecutive compound rows sharing one slot
    pub rows_per_slot: usize,
    /// Number of slots per pattern
    pub slots_per_pattern: u32,
}

impl Default for SlotLayout {
    fn default() -> Self {
        Self {
            rows_per_slot: 25,
            slots_per_pattern: 4,
        }
    }
}

impl SlotLayout {
    /// Rows covered before the slot assignment wraps (saturating)
    pub fn cycle_len(&self) -> usize {
        self.rows_per_slot.saturating_mul(self.slots_per_pattern as usize)
    }

    /// Check that the layout can assign at least one row
    pub fn validate(&self) -> Result<(), String> {
        if self.rows_per_slot == 0 {
            return Err("rows_per_slot must be at least 1".to_string());
        }
        if self.slots_per_pattern == 0 {
            return Err("slots_per_pattern must be at least 1".to_string());
        }
        if self.rows_per_slot.checked_mul(self.slots_per_pattern as usize).is_none() {
            return Err(format!(
                "{} rows per slot x {} slots overflows the row count",
                self.rows_per_slot, self.slots_per_pattern
            ));
        }
        Ok(())
    }

    /// Slot for a 1-based compound row index: `((i - 1) mod cycle) / rows_per_slot + 1`.
    ///
    /// Row index 0 is treated as row 1.
    pub fn slot_for_row(&self, row_index: usize) -> Slot {
        let cycle = self.cycle_len().max(1);
        let per_slot = self.rows_per_slot.max(1);
        let offset = row_index.saturating_sub(1) % cycle;
        Slot((offset / per_slot) as u32 + 1)
    }
}

/// Slot for a 1-based row index under the default quartering layout
pub fn slot_for_row(row_index: usize) -> Slot {
    SlotLayout::default().slot_for_row(row_index)
}

/// Pattern for a sample identifier under the default hundred-block rule
pub fn pattern_for_sample(sample: &SampleId) -> RangePattern {
    sample.range_block()
}

/// Where a sample's pattern came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternSource {
    /// Derived from the numeric suffix
    Derived,
    /// Declared in the sample index
    SampleIndex,
}

/// The pattern assigned to one sample column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternAssignment {
    /// Sample identifier
    pub sample: String,
    /// Reference family used to normalise the sample
    pub pattern: RangePattern,
    /// Derived or overridden
    pub source: PatternSource,
    /// Plate metadata from the sample index, if declared
    pub plate: Option<String>,
}

/// Pattern assignments for every sample column of a matrix, in column order
#[derive(Debug, Clone, Default)]
pub struct SampleGroups {
    assignments: Vec<PatternAssignment>,
}

impl SampleGroups {
    /// Assignment for a sample column position
    pub fn get(&self, sample: usize) -> Option<&PatternAssignment> {
        self.assignments.get(sample)
    }

    /// All assignments in column order
    pub fn assignments(&self) -> &[PatternAssignment] {
        &self.assignments
    }

    /// Distinct patterns in use, ascending
    pub fn patterns(&self) -> Vec<RangePattern> {
        self.assignments
            .iter()
            .map(|a| a.pattern)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sample column positions normalised against a pattern
    pub fn samples_in(&self, pattern: RangePattern) -> Vec<usize> {
        self.assignments
            .iter()
            .enumerate()
            .filter(|(_, a)| a.pattern == pattern)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Maps sample columns to reference patterns and compound rows to slots
#[derive(Debug, Clone, Copy)]
pub struct SampleGroupResolver<'a> {
    store: &'a ReferenceDataStore,
    layout: SlotLayout,
}

impl<'a> SampleGroupResolver<'a> {
    /// Resolver over a reference store with the given slot layout
    pub fn new(store: &'a ReferenceDataStore, layout: SlotLayout) -> Self {
        Self { store, layout }
    }

    /// Slot layout in use
    pub fn layout(&self) -> SlotLayout {
        self.layout
    }

    /// Pattern for one sample, honouring sample-index overrides
    pub fn pattern_for(&self, sample: &SampleId) -> PatternAssignment {
        let entry = self.store.sample_entry(&sample.identifier);
        let plate = entry.and_then(|e| e.plate.clone());
        match entry.and_then(|e| e.pattern) {
            Some(pattern) => PatternAssignment {
                sample: sample.identifier.clone(),
                pattern,
                source: PatternSource::SampleIndex,
                plate,
            },
            None => PatternAssignment {
                sample: sample.identifier.clone(),
                pattern: pattern_for_sample(sample),
                source: PatternSource::Derived,
                plate,
            },
        }
    }

    /// Pattern assignments for every sample column of the matrix
    pub fn resolve(&self, matrix: &AreaMatrix) -> SampleGroups {
        SampleGroups {
            assignments: matrix.samples().iter().map(|s| self.pattern_for(s)).collect(),
        }
    }

    /// Slot for a 1-based compound row index
    pub fn slot_for_row(&self, row_index: usize) -> Slot {
        self.layout.slot_for_row(row_index)
    }

    /// Reference ratio for exactly this (compound, pattern, slot)
    pub fn reference_ratio(
        &self,
        compound: &str,
        pattern: RangePattern,
        slot: Slot,
    ) -> Result<ReferenceRatio, MissingReferenceError> {
        self.store.reference_ratio(compound, pattern, slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_slot_quartering_boundaries() {
        let cases = [
            (1, 1),
            (25, 1),
            (26, 2),
            (50, 2),
            (51, 3),
            (75, 3),
            (76, 4),
            (100, 4),
            (101, 1),
            (126, 2),
            (200, 4),
        ];
        for (row, expected) in cases {
            assert_eq!(slot_for_row(row).get(), expected, "row {}", row);
        }
    }

    #[test]
    fn test_custom_layout() {
        let layout = SlotLayout {
            rows_per_slot: 50,
            slots_per_pattern: 2,
        };
        assert_eq!(layout.slot_for_row(50).get(), 1);
        assert_eq!(layout.slot_for_row(51).get(), 2);
        assert_eq!(layout.slot_for_row(101).get(), 1);
        assert!(SlotLayout {
            rows_per_slot: 0,
            slots_per_pattern: 4
        }
        .validate()
        .is_err());
    }

    #[test]
    fn test_overflowing_layout_is_rejected() {
        let layout = SlotLayout {
            rows_per_slot: usize::MAX / 2,
            slots_per_pattern: 4,
        };
        assert!(layout.validate().unwrap_err().contains("overflows"));
        assert_eq!(layout.cycle_len(), usize::MAX);
        assert_eq!(layout.slot_for_row(1).get(), 1);
        assert!(SlotLayout {
            rows_per_slot: usize::MAX,
            slots_per_pattern: 1
        }
        .validate()
        .is_ok());
    }

    #[test]
    fn test_sample_patterns() {
        let pattern = |id: &str| pattern_for_sample(&SampleId::parse(id).unwrap()).to_string();
        assert_eq!(pattern("PH-HC_5712"), "5700-5800");
        assert_eq!(pattern("PH-HC_5799"), "5700-5800");
        assert_eq!(pattern("PH-HC_5800"), "5800-5900");
    }

    #[test]
    fn test_slot_new_rejects_zero() {
        assert!(Slot::new(0).is_none());
        assert_eq!(Slot::new(3).map(Slot::get), Some(3));
    }

    proptest! {
        #[test]
        fn test_slot_is_periodic(row in 1usize..10_000) {
            prop_assert_eq!(slot_for_row(row), slot_for_row(row + 100));
        }

        #[test]
        fn test_slot_in_range(row in 0usize..100_000) {
            let slot = slot_for_row(row).get();
            prop_assert!((1..=4).contains(&slot));
        }

        #[test]
        fn test_pattern_contains_suffix(suffix in 0u64..1_000_000) {
            let pattern = RangePattern::for_suffix(suffix);
            prop_assert!(pattern.start <= suffix && suffix < pattern.end);
            prop_assert_eq!(pattern.end - pattern.start, 100);
            prop_assert_eq!(pattern.start % 100, 0);
        }
    }
}
