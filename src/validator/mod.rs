//! # Pre-flight validation
//!
//! Inspects a validated workbook against the reference tables before a run
//! and reports, per check, what the run will not be able to compute. Nothing
//! here is fatal by itself except an invalid coefficient; the checks exist
//! so a user can fix coverage gaps before reading a report full of
//! unavailable cells.
//!
//! ## Checks
//!
//! 1. **Workbook shape**: compound and sample counts, skipped blank rows,
//!    rows past one slot cycle
//! 2. **Compound index coverage**: workbook compounds without an index entry
//! 3. **ISTD rows**: declared internal standards missing from the workbook
//! 4. **Sample patterns**: patterns in use, sample index overrides
//! 5. **NIST reference coverage**: every (pattern, slot, compound) the run needs
//! 6. **Coefficient**: positive and finite
//!
//! ```rust,no_run
//! use lipidcalc::calc::EngineSettings;
//! use lipidcalc::validator::validate_inputs;
//! # fn demo(store: &lipidcalc::reference::ReferenceDataStore, matrix: &lipidcalc::matrix::AreaMatrix) {
//! let report = validate_inputs(store, matrix, &EngineSettings::default());
//! println!("{}", report);
//! # }
//! ```

mod report;

use std::collections::BTreeSet;

use log::debug;

use crate::calc::EngineSettings;
use crate::grouping::{PatternSource, SampleGroupResolver};
use crate::matrix::AreaMatrix;
use crate::reference::ReferenceDataStore;

pub use report::{CheckStatus, ValidationCheck, ValidationReport};

/// Name of the workbook shape check
pub const CHECK_WORKBOOK: &str = "Workbook shape";
/// Name of the compound index coverage check
pub const CHECK_COMPOUNDS: &str = "Compound index coverage";
/// Name of the ISTD row check
pub const CHECK_ISTD: &str = "ISTD rows";
/// Name of the sample pattern check
pub const CHECK_PATTERNS: &str = "Sample patterns";
/// Name of the NIST reference coverage check
pub const CHECK_NIST: &str = "NIST reference coverage";
/// Name of the coefficient check
pub const CHECK_COEFFICIENT: &str = "Coefficient";

const MAX_DETAILS: usize = 5;

fn preview(items: Vec<String>) -> Vec<String> {
    let total = items.len();
    let mut shown: Vec<String> = items.into_iter().take(MAX_DETAILS).collect();
    if total > MAX_DETAILS {
        shown.push(format!("... and {} more", total - MAX_DETAILS));
    }
    shown
}

/// Run every pre-flight check
pub fn validate_inputs(store: &ReferenceDataStore, matrix: &AreaMatrix, settings: &EngineSettings) -> ValidationReport {
    let mut report = ValidationReport::new(format!(
        "{} compounds x {} samples",
        matrix.compound_count(),
        matrix.sample_count()
    ));

    check_workbook(matrix, settings, &mut report);
    check_compounds(store, matrix, &mut report);
    check_istd_rows(store, matrix, &mut report);
    check_patterns(store, matrix, settings, &mut report);
    check_nist_coverage(store, matrix, settings, &mut report);
    check_coefficient(settings, &mut report);

    debug!(
        "Pre-flight: {} passed, {} warnings, {} failed",
        report.success_count(),
        report.warning_count(),
        report.failure_count()
    );
    report
}

fn check_workbook(matrix: &AreaMatrix, settings: &EngineSettings, report: &mut ValidationReport) {
    let mut notes = Vec::new();
    if matrix.skipped_blank_rows() > 0 {
        notes.push(format!("{} blank row(s) skipped", matrix.skipped_blank_rows()));
    }
    let cycle = settings.slot_layout.cycle_len();
    if matrix.compound_count() > cycle {
        notes.push(format!(
            "{} compounds exceed one slot cycle of {}; rows {}+ wrap to slot 1",
            matrix.compound_count(),
            cycle,
            cycle + 1
        ));
    }

    let summary = format!(
        "{} compounds, {} samples, {} NIST columns",
        matrix.compound_count(),
        matrix.sample_count(),
        matrix.reference_columns().len()
    );
    if notes.is_empty() {
        report.add_check(ValidationCheck::ok(CHECK_WORKBOOK).with_details(vec![summary]));
    } else {
        report.add_check(ValidationCheck::warning(CHECK_WORKBOOK, notes.join("; ")).with_details(vec![summary]));
    }
}

fn check_compounds(store: &ReferenceDataStore, matrix: &AreaMatrix, report: &mut ValidationReport) {
    let unknown: Vec<String> = matrix
        .compounds()
        .iter()
        .filter(|name| store.compound(name).is_none())
        .cloned()
        .collect();

    if unknown.is_empty() {
        report.add_check(ValidationCheck::ok(CHECK_COMPOUNDS));
    } else {
        report.add_check(
            ValidationCheck::warning(
                CHECK_COMPOUNDS,
                format!("{} workbook compound(s) missing from the compound index", unknown.len()),
            )
            .with_details(preview(unknown)),
        );
    }
}

fn check_istd_rows(store: &ReferenceDataStore, matrix: &AreaMatrix, report: &mut ValidationReport) {
    let mut problems = Vec::new();
    for name in matrix.compounds() {
        let Some(compound) = store.compound(name) else {
            continue;
        };
        match &compound.istd_name {
            None => problems.push(format!("{}: no ISTD declared", name)),
            Some(istd) if matrix.find_row(istd).is_none() => {
                problems.push(format!("{}: ISTD '{}' has no workbook row", name, istd));
            }
            Some(_) => {}
        }
    }

    if problems.is_empty() {
        report.add_check(ValidationCheck::ok(CHECK_ISTD));
    } else {
        report.add_check(
            ValidationCheck::warning(CHECK_ISTD, format!("{} compound(s) cannot form a ratio", problems.len()))
                .with_details(preview(problems)),
        );
    }
}

fn check_patterns(
    store: &ReferenceDataStore,
    matrix: &AreaMatrix,
    settings: &EngineSettings,
    report: &mut ValidationReport,
) {
    let groups = SampleGroupResolver::new(store, settings.slot_layout).resolve(matrix);
    let overridden = groups
        .assignments()
        .iter()
        .filter(|a| a.source == PatternSource::SampleIndex)
        .count();
    let mut details: Vec<String> = groups
        .patterns()
        .into_iter()
        .map(|pattern| format!("{}: {} sample(s)", pattern, groups.samples_in(pattern).len()))
        .collect();

    let known = store.nist_patterns();
    let uncovered: Vec<String> = groups
        .patterns()
        .into_iter()
        .filter(|p| !known.contains(p))
        .map(|p| p.to_string())
        .collect();

    details.push(format!("{} sample index override(s)", overridden));

    let check = if uncovered.is_empty() {
        ValidationCheck::ok(CHECK_PATTERNS)
    } else {
        ValidationCheck::warning(
            CHECK_PATTERNS,
            format!("no NIST ratios for pattern(s) {}", uncovered.join(", ")),
        )
    };
    report.add_check(check.with_details(details));
}

fn check_nist_coverage(
    store: &ReferenceDataStore,
    matrix: &AreaMatrix,
    settings: &EngineSettings,
    report: &mut ValidationReport,
) {
    let resolver = SampleGroupResolver::new(store, settings.slot_layout);
    let patterns = resolver.resolve(matrix).patterns();
    let measured: BTreeSet<_> = matrix
        .reference_columns()
        .iter()
        .map(|c| (c.pattern, c.slot))
        .collect();

    let mut missing = Vec::new();
    let mut invalid = Vec::new();
    let mut from_columns = 0usize;
    let mut needed = 0usize;

    for (row, compound) in matrix.compounds().iter().enumerate() {
        if store.compound(compound).is_none() {
            continue;
        }
        let slot = resolver.slot_for_row(row + 1);
        for &pattern in &patterns {
            needed += 1;
            match resolver.reference_ratio(compound, pattern, slot) {
                Ok(reference) if reference.value > 0.0 && reference.value.is_finite() => {}
                Ok(reference) => invalid.push(format!(
                    "{} / {} slot {}: ratio {}",
                    compound, pattern, slot, reference.value
                )),
                Err(_) if settings.derive_missing_references && measured.contains(&(pattern, slot.get())) => {
                    from_columns += 1;
                }
                Err(_) => missing.push(format!("{} / {} slot {}", compound, pattern, slot)),
            }
        }
    }

    if missing.is_empty() && invalid.is_empty() {
        let mut summary = format!("{} lookups covered", needed);
        if from_columns > 0 {
            summary.push_str(&format!(", {} from measured NIST columns", from_columns));
        }
        report.add_check(ValidationCheck::ok(CHECK_NIST).with_details(vec![summary]));
        return;
    }

    let message = format!(
        "{} of {} reference lookups missing, {} invalid",
        missing.len(),
        needed,
        invalid.len()
    );
    let mut details = preview(missing);
    details.extend(preview(invalid));
    report.add_check(ValidationCheck::warning(CHECK_NIST, message).with_details(details));
}

fn check_coefficient(settings: &EngineSettings, report: &mut ValidationReport) {
    match settings.validate() {
        Ok(()) => report.add_check(
            ValidationCheck::ok(CHECK_COEFFICIENT).with_details(vec![format!("coefficient {}", settings.coefficient)]),
        ),
        Err(error) => report.add_check(ValidationCheck::failed(CHECK_COEFFICIENT, error.to_string())),
    }
}

#[cfg(test)]
mod tests;
