//! # Reference data
//!
//! The three read-only tables every run is evaluated against:
//!
//! 1. **Compound Index**: compound → internal standard, concentration (nM),
//!    response factor
//! 2. **NIST Ratio Table**: (pattern, slot, compound) → certified
//!    compound/ISTD reference ratio
//! 3. **Sample Index** (optional): sample → pattern override and plate label
//!
//! A [`ReferenceDataStore`] is immutable once loaded and can be shared across
//! concurrent runs behind an `Arc`. Per-run state (matrix, ledger, tables)
//! never lives here.
//!
//! Missing NIST ratios are not a load-time failure: not every run needs every
//! pattern, so they surface lazily as [`MissingReferenceError`] for the cells
//! that actually need them.

mod compound;
mod error;
mod nist;
mod sample_index;


use std::collections::{BTreeSet, HashMap};

use log::{debug, info};

use crate::grouping::{Slot, SlotLayout};
use crate::matrix::RangePattern;
use crate::sheet::RawSheet;

use compound::CompoundIndex;
use nist::NistRatioTable;

pub use compound::{Compound, DEFAULT_RESPONSE_FACTOR};
pub use error::{MissingReferenceError, ReferenceDataError};
pub use sample_index::SampleIndexEntry;

/// A NIST reference ratio found in the ratio table
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ReferenceRatio {
    /// Compound name as written in the ratio table
    pub compound: String,
    /// Reference family
    pub pattern: RangePattern,
    /// Slot within the family
    pub slot: Slot,
    /// Reference ratio; non-positive values are stored and rejected at use
    pub value: f64,
}

/// Indexed, read-only reference tables
#[derive(Debug, Clone, Default)]
pub struct ReferenceDataStore {
    compounds: CompoundIndex,
    nist: NistRatioTable,
    samples: HashMap<String, SampleIndexEntry>,
}

impl ReferenceDataStore {
    /// Load and index the reference tables.
    ///
    /// All three tables are checked in one pass. Any structural problem
    /// (missing column, unparsable key, duplicate) yields
    /// [`ReferenceDataError::Structural`] carrying every issue found;
    /// otherwise an absent or invalid concentration / response factor yields
    /// [`ReferenceDataError::Integrity`].
    ///
    /// Slots are checked against the default [`SlotLayout`]; use
    /// [`ReferenceDataStore::load_with_layout`] for a custom one.
    pub fn load(
        compound_index: &RawSheet,
        nist_ratio_table: &RawSheet,
        sample_index: Option<&RawSheet>,
    ) -> Result<Self, ReferenceDataError> {
        Self::load_with_layout(compound_index, nist_ratio_table, sample_index, SlotLayout::default())
    }

    /// Load the reference tables, accepting NIST slots `1..=layout.slots_per_pattern`
    pub fn load_with_layout(
        compound_index: &RawSheet,
        nist_ratio_table: &RawSheet,
        sample_index: Option<&RawSheet>,
        layout: SlotLayout,
    ) -> Result<Self, ReferenceDataError> {
        let mut structural = Vec::new();
        let mut integrity = Vec::new();

        let compounds = CompoundIndex::parse(compound_index, &mut structural, &mut integrity);
        let nist = NistRatioTable::parse(nist_ratio_table, layout.slots_per_pattern, &mut structural);
        let samples = sample_index
            .map(|sheet| sample_index::parse_sample_index(sheet, &mut structural))
            .unwrap_or_default();

        if !structural.is_empty() {
            structural.extend(integrity);
            return Err(ReferenceDataError::Structural(structural));
        }
        if !integrity.is_empty() {
            return Err(ReferenceDataError::Integrity(integrity));
        }

        info!(
            "Loaded reference data: {} compounds, {} NIST ratios over {} (pattern, slot) pairs, {} sample index entries",
            compounds.compounds.len(),
            nist.len(),
            nist.keys().count(),
            samples.len()
        );

        Ok(Self {
            compounds,
            nist,
            samples,
        })
    }

    /// Compound by exact name, falling back to the canonical name key
    pub fn compound(&self, name: &str) -> Option<&Compound> {
        self.compounds.get(name)
    }

    /// All compounds in index order
    pub fn compounds(&self) -> &[Compound] {
        &self.compounds.compounds
    }

    /// Number of NIST ratio entries
    pub fn nist_ratio_count(&self) -> usize {
        self.nist.len()
    }

    /// Patterns that have at least one NIST ratio
    pub fn nist_patterns(&self) -> BTreeSet<RangePattern> {
        self.nist.keys().map(|(pattern, _)| pattern).collect()
    }

    /// Every (pattern, slot) pair present in the ratio table, ascending
    pub fn nist_slots(&self) -> BTreeSet<(RangePattern, Slot)> {
        self.nist.keys().collect()
    }

    /// Reference ratio for exactly this (compound, pattern, slot)
    pub fn reference_ratio(
        &self,
        compound: &str,
        pattern: RangePattern,
        slot: Slot,
    ) -> Result<ReferenceRatio, MissingReferenceError> {
        match self.nist.get(compound, pattern, slot) {
            Some(entry) => Ok(ReferenceRatio {
                compound: entry.compound.clone(),
                pattern,
                slot,
                value: entry.ratio,
            }),
            None => {
                debug!("No NIST ratio for '{}' in {} slot {}", compound, pattern, slot);
                Err(MissingReferenceError {
                    compound: compound.to_string(),
                    pattern,
                    slot,
                })
            }
        }
    }

    /// Sample index entry for a sample identifier
    pub fn sample_entry(&self, sample: &str) -> Option<&SampleIndexEntry> {
        self.samples.get(sample.trim())
    }

    /// Number of sample index entries
    pub fn sample_index_len(&self) -> usize {
        self.samples.len()
    }
}
