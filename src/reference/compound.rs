use std::collections::HashMap;

use serde::Serialize;

use crate::error::{InputIssue, IssueLocation};
use crate::names::canonical_key;
use crate::sheet::RawSheet;

const TABLE: &str = "compound index";

const COMPOUND_COLUMN: &[&str] = &["compound", "compound name", "substance"];
const ISTD_COLUMN: &[&str] = &["istd_name", "istd", "istd name", "internal standard"];
const CONCENTRATION_COLUMN: &[&str] = &["concentration_nm", "conc. (nm)", "conc_nm", "conc (nm)", "concentration (nm)"];
const RESPONSE_FACTOR_COLUMN: &[&str] = &["response_factor", "response factor", "rf"];

/// Default response factor when the compound index leaves it blank
pub const DEFAULT_RESPONSE_FACTOR: f64 = 1.0;

/// One entry of the compound index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Compound {
    /// Compound name (unique key)
    pub name: String,
    /// Internal standard normalising this compound; may name another compound
    pub istd_name: Option<String>,
    /// Molar concentration of the standard in nM
    pub concentration_nm: f64,
    /// Instrument response factor
    pub response_factor: f64,
}

/// Parsed compound index with lookups by exact name and canonical key
#[derive(Debug, Clone, Default)]
pub(crate) struct CompoundIndex {
    pub(crate) compounds: Vec<Compound>,
    by_name: HashMap<String, usize>,
    by_key: HashMap<String, usize>,
}

impl CompoundIndex {
    pub(crate) fn get(&self, name: &str) -> Option<&Compound> {
        self.by_name
            .get(name)
            .or_else(|| self.by_key.get(&canonical_key(name)))
            .map(|&i| &self.compounds[i])
    }

    /// Parse the sheet; structural and integrity issues are collected separately
    pub(crate) fn parse(
        sheet: &RawSheet,
        structural: &mut Vec<InputIssue>,
        integrity: &mut Vec<InputIssue>,
    ) -> Self {
        let mut index = Self::default();

        let compound_col = require_column(sheet, TABLE, COMPOUND_COLUMN, "compound", structural);
        let istd_col = require_column(sheet, TABLE, ISTD_COLUMN, "istd_name", structural);
        let conc_col = require_column(sheet, TABLE, CONCENTRATION_COLUMN, "concentration_nM", structural);
        let rf_col = sheet.column_index(RESPONSE_FACTOR_COLUMN);

        let (Some(compound_col), Some(istd_col), Some(conc_col)) = (compound_col, istd_col, conc_col)
        else {
            return index;
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

            let Some(name) = sheet.cell(row, compound_col).as_text() else {
                structural.push(InputIssue::new(at(compound_col), "compound name is empty"));
                continue;
            };

            let key = canonical_key(&name);
            if index.by_name.contains_key(&name) {
                structural.push(InputIssue::new(
                    at(compound_col),
                    format!("duplicate compound '{}'", name),
                ));
                continue;
            }
            if let Some(&other) = index.by_key.get(&key) {
                structural.push(InputIssue::new(
                    at(compound_col),
                    format!(
                        "compound '{}' is indistinguishable from '{}' after name normalisation",
                        name, index.compounds[other].name
                    ),
                ));
                continue;
            }

            let istd_name = sheet.cell(row, istd_col).as_text();

            let concentration_nm = match sheet.cell(row, conc_col).as_number() {
                Ok(Some(v)) if v.is_finite() && v > 0.0 => Some(v),
                Ok(Some(v)) => {
                    integrity.push(InputIssue::new(
                        at(conc_col),
                        format!("concentration {} for '{}' must be positive", v, name),
                    ));
                    None
                }
                Ok(None) => {
                    integrity.push(InputIssue::new(
                        at(conc_col),
                        format!("concentration for '{}' is missing", name),
                    ));
                    None
                }
                Err(text) => {
                    integrity.push(InputIssue::new(
                        at(conc_col),
                        format!("concentration '{}' for '{}' is not a number", text, name),
                    ));
                    None
                }
            };

            let response_factor = match rf_col.map(|c| (c, sheet.cell(row, c).as_number())) {
                None | Some((_, Ok(None))) => Some(DEFAULT_RESPONSE_FACTOR),
                Some((_, Ok(Some(v)))) if v.is_finite() && v > 0.0 => Some(v),
                Some((c, Ok(Some(v)))) => {
                    integrity.push(InputIssue::new(
                        at(c),
                        format!("response factor {} for '{}' must be positive", v, name),
                    ));
                    None
                }
                Some((c, Err(text))) => {
                    integrity.push(InputIssue::new(
                        at(c),
                        format!("response factor '{}' for '{}' is not a number", text, name),
                    ));
                    None
                }
            };

            if let (Some(concentration_nm), Some(response_factor)) = (concentration_nm, response_factor) {
                let position = index.compounds.len();
                index.by_name.insert(name.clone(), position);
                index.by_key.insert(key, position);
                index.compounds.push(Compound {
                    name,
                    istd_name,
                    concentration_nm,
                    response_factor,
                });
            }
        }

        index
    }
}

pub(crate) fn require_column(
    sheet: &RawSheet,
    table: &str,
    aliases: &[&str],
    display: &str,
    issues: &mut Vec<InputIssue>,
) -> Option<usize> {
    let found = sheet.column_index(aliases);
    if found.is_none() {
        issues.push(InputIssue::new(
            IssueLocation::table(table).column(display),
            format!("required column '{}' is missing", display),
        ));
    }
    found
}
