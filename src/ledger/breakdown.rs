//! Human-readable derivation of a single cell.

use std::fmt;

use serde::Serialize;

use super::record::{CalculationRecord, ReferenceSource};
use crate::calc::CellStage;

/// One formula of the derivation chain with its substituted values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormulaStep {
    /// Step number: 1 ratio, 2 NIST, 3 Agilent
    pub step: u8,
    /// Short title
    pub title: String,
    /// Formula in words
    pub formula: String,
    /// Formula with the recorded values substituted, when all inputs exist
    pub substituted: Option<String>,
    /// Result of the step
    pub result: Option<f64>,
    /// Why the step produced no result
    pub note: Option<String>,
}

impl fmt::Display for FormulaStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Step {}: {}", self.step, self.title)?;
        writeln!(f, "  {}", self.formula)?;
        if let Some(substituted) = &self.substituted {
            write!(f, "  = {}", substituted)?;
            match self.result {
                Some(result) => writeln!(f, " = {}", result)?,
                None => writeln!(f)?,
            }
        }
        if let Some(note) = &self.note {
            writeln!(f, "  unavailable: {}", note)?;
        }
        Ok(())
    }
}

/// Ordered derivation steps of a cell
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    /// Compound name
    pub compound: String,
    /// Sample identifier
    pub sample: String,
    /// Steps in derivation order
    pub steps: Vec<FormulaStep>,
}

impl fmt::Display for Breakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} / {}", self.compound, self.sample)?;
        for step in &self.steps {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

fn first_error(record: &CalculationRecord, stage: CellStage) -> Option<String> {
    record
        .errors
        .iter()
        .find(|e| e.stage() == stage)
        .map(ToString::to_string)
}

impl CalculationRecord {
    /// Derivation steps of this cell with recorded values substituted
    pub fn breakdown(&self) -> Breakdown {
        let ratio_error = first_error(self, CellStage::Ratio);

        let ratio_step = FormulaStep {
            step: 1,
            title: "Ratio".to_string(),
            formula: format!(
                "Area({}) ÷ Area({})",
                self.compound,
                self.istd_name.as_deref().unwrap_or("ISTD")
            ),
            substituted: match (self.source_area, self.istd_area) {
                (Some(area), Some(istd)) => Some(format!("{} ÷ {}", area, istd)),
                _ => None,
            },
            result: self.ratio,
            note: ratio_error.clone(),
        };

        let reference = self.nist_reference_used.as_ref();
        let nist_step = FormulaStep {
            step: 2,
            title: "NIST result".to_string(),
            formula: format!(
                "Ratio ÷ NIST reference ratio (pattern {}, slot {}{})",
                self.pattern,
                self.slot,
                match reference.map(|r| &r.source) {
                    Some(ReferenceSource::MeasuredColumn { column }) => format!(", from {}", column),
                    _ => String::new(),
                }
            ),
            substituted: match (self.ratio, reference) {
                (Some(ratio), Some(reference)) => Some(format!("{} ÷ {}", ratio, reference.value)),
                _ => None,
            },
            result: self.nist_result,
            note: ratio_error.clone().or_else(|| first_error(self, CellStage::Nist)),
        };

        let agilent_step = FormulaStep {
            step: 3,
            title: "Agilent result".to_string(),
            formula: "Ratio × Conc. (nM) × Response factor × Coefficient".to_string(),
            substituted: match (self.ratio, self.agilent_inputs) {
                (Some(ratio), Some(inputs)) => Some(format!(
                    "{} × {} × {} × {}",
                    ratio, inputs.concentration_nm, inputs.response_factor, inputs.coefficient
                )),
                _ => None,
            },
            result: self.agilent_result,
            note: ratio_error,
        };

        Breakdown {
            compound: self.compound.clone(),
            sample: self.sample.clone(),
            steps: vec![ratio_step, nist_step, agilent_step],
        }
    }
}
