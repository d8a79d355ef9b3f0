use crate::ledger::{AgilentInputs, CalculationRecord};
use crate::reference::Compound;

/// Converts a cell ratio into a concentration with the compound's standard
/// concentration, response factor and the run coefficient
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgilentConverter {
    coefficient: f64,
}

impl AgilentConverter {
    /// Converter for a validated coefficient
    pub fn new(coefficient: f64) -> Self {
        Self { coefficient }
    }

    /// Coefficient applied to every cell
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// `ratio × concentration × response factor × coefficient`
    pub fn concentration(&self, ratio: f64, compound: &Compound) -> f64 {
        ratio * compound.concentration_nm * compound.response_factor * self.coefficient
    }

    /// Fill the Agilent part of a record. Inputs are recorded whenever the
    /// compound is known; the result only when the ratio exists.
    pub fn convert(&self, record: &mut CalculationRecord, compound: Option<&Compound>) {
        let Some(compound) = compound else {
            return;
        };
        record.agilent_inputs = Some(AgilentInputs {
            concentration_nm: compound.concentration_nm,
            response_factor: compound.response_factor,
            coefficient: self.coefficient,
        });
        record.agilent_result = record.ratio.map(|ratio| self.concentration(ratio, compound));
    }
}
