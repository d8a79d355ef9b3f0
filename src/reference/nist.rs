use std::collections::HashMap;

use crate::error::{InputIssue, IssueLocation};
use crate::grouping::Slot;
use crate::matrix::RangePattern;
use crate::names::canonical_key;
use crate::sheet::RawSheet;

use super::compound::require_column;

const TABLE: &str = "NIST ratio table";

const PATTERN_COLUMN: &[&str] = &["pattern", "range_pattern", "range"];
const SLOT_COLUMN: &[&str] = &["slot"];
const COMPOUND_COLUMN: &[&str] = &["compound", "compound name", "substance"];
const RATIO_COLUMN: &[&str] = &["reference_ratio", "reference ratio", "ratio", "nist_ratio", "nist ratio"];

#[derive(Debug, Clone)]
pub(crate) struct NistEntry {
    pub(crate) compound: String,
    pub(crate) ratio: f64,
}

/// `(pattern, slot) -> canonical compound key -> entry`
#[derive(Debug, Clone, Default)]
pub(crate) struct NistRatioTable {
    entries: HashMap<(RangePattern, Slot), HashMap<String, NistEntry>>,
    len: usize,
}

impl NistRatioTable {
    pub(crate) fn get(&self, compound: &str, pattern: RangePattern, slot: Slot) -> Option<&NistEntry> {
        self.entries
            .get(&(pattern, slot))
            .and_then(|by_compound| by_compound.get(&canonical_key(compound)))
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = (RangePattern, Slot)> + '_ {
        self.entries.keys().copied()
    }

    /// Parse the sheet; slots outside `1..=slots_per_pattern` are structural issues
    pub(crate) fn parse(sheet: &RawSheet, slots_per_pattern: u32, structural: &mut Vec<InputIssue>) -> Self {
        let mut table = Self::default();

        let pattern_col = require_column(sheet, TABLE, PATTERN_COLUMN, "pattern", structural);
        let slot_col = require_column(sheet, TABLE, SLOT_COLUMN, "slot", structural);
        let compound_col = require_column(sheet, TABLE, COMPOUND_COLUMN, "compound", structural);
        let ratio_col = require_column(sheet, TABLE, RATIO_COLUMN, "reference_ratio", structural);

        let (Some(pattern_col), Some(slot_col), Some(compound_col), Some(ratio_col)) =
            (pattern_col, slot_col, compound_col, ratio_col)
        else {
            return table;
        };

        for row in 0..sheet.rows.len() {
            if sheet.is_blank_row(row) {
                continue;
            }
            let at = |column: usize| {
                IssueLocation::table(TABLE)
                    .row(row + 1)
                    .column(sheet.header[column].clone())
            };
            let before = structural.len();

            let pattern = match sheet.cell(row, pattern_col).as_text() {
                Some(text) => match text.parse::<RangePattern>() {
                    Ok(p) => Some(p),
                    Err(message) => {
                        structural.push(InputIssue::new(at(pattern_col), message));
                        None
                    }
                },
                None => {
                    structural.push(InputIssue::new(at(pattern_col), "pattern is empty"));
                    None
                }
            };

            let slot = match sheet.cell(row, slot_col).as_number() {
                Ok(Some(v)) if v.fract() == 0.0 && v >= 1.0 && v <= f64::from(slots_per_pattern) => {
                    Slot::new(v as u32)
                }
                Ok(Some(v)) => {
                    structural.push(InputIssue::new(
                        at(slot_col),
                        format!(
                            "slot {} must be a whole number between 1 and {}",
                            v, slots_per_pattern
                        ),
                    ));
                    None
                }
                Ok(None) => {
                    structural.push(InputIssue::new(at(slot_col), "slot is empty"));
                    None
                }
                Err(text) => {
                    structural.push(InputIssue::new(
                        at(slot_col),
                        format!("slot '{}' is not a number", text),
                    ));
                    None
                }
            };

            let compound = sheet.cell(row, compound_col).as_text();
            if compound.is_none() {
                structural.push(InputIssue::new(at(compound_col), "compound name is empty"));
            }

            let ratio = match sheet.cell(row, ratio_col).as_number() {
                Ok(Some(v)) if v.is_finite() => Some(v),
                Ok(Some(v)) => {
                    structural.push(InputIssue::new(
                        at(ratio_col),
                        format!("reference ratio {} is not finite", v),
                    ));
                    None
                }
                Ok(None) => {
                    structural.push(InputIssue::new(at(ratio_col), "reference ratio is empty"));
                    None
                }
                Err(text) => {
                    structural.push(InputIssue::new(
                        at(ratio_col),
                        format!("reference ratio '{}' is not a number", text),
                    ));
                    None
                }
            };

            if structural.len() != before {
                continue;
            }
            let (Some(pattern), Some(slot), Some(compound), Some(ratio)) = (pattern, slot, compound, ratio)
            else {
                continue;
            };

            let by_compound = table.entries.entry((pattern, slot)).or_default();
            let key = canonical_key(&compound);
            if let Some(existing) = by_compound.get(&key) {
                structural.push(InputIssue::new(
                    at(compound_col),
                    format!(
                        "duplicate reference ratio for '{}' in pattern {} slot {} (already given for '{}')",
                        compound, pattern, slot, existing.compound
                    ),
                ));
                continue;
            }
            by_compound.insert(key, NistEntry { compound, ratio });
            table.len += 1;
        }

        table
    }
}
