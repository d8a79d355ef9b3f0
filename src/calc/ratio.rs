use crate::matrix::AreaMatrix;
use crate::reference::ReferenceDataStore;

use super::CellError;
use crate::ledger::CalculationRecord;

/// Inputs and outcome of one compound ÷ ISTD division
#[derive(Debug, Clone, PartialEq)]
pub struct RatioMeasurement {
    /// Compound area
    pub source_area: Option<f64>,
    /// Declared internal standard
    pub istd_name: Option<String>,
    /// 0-based workbook row of the internal standard
    pub istd_row: Option<usize>,
    /// Internal standard area
    pub istd_area: Option<f64>,
    /// The ratio, or the first reason it could not be computed
    pub outcome: Result<f64, CellError>,
}

impl RatioMeasurement {
    /// The ratio if it could be computed
    pub fn value(&self) -> Option<f64> {
        self.outcome.as_ref().ok().copied()
    }

    /// Copy the measurement into a record
    pub fn apply(self, record: &mut CalculationRecord) {
        record.source_area = self.source_area;
        record.istd_name = self.istd_name;
        record.istd_row_index = self.istd_row.map(|r| r + 1);
        record.istd_found = self.istd_row.is_some();
        record.istd_area = self.istd_area;
        match self.outcome {
            Ok(ratio) => record.ratio = Some(ratio),
            Err(error) => record.errors.push(error),
        }
    }
}

/// Divides each compound area by the area of its internal standard in the same column
#[derive(Debug, Clone, Copy)]
pub struct RatioCalculator<'a> {
    matrix: &'a AreaMatrix,
    store: &'a ReferenceDataStore,
}

impl<'a> RatioCalculator<'a> {
    /// Calculator over one matrix and its reference data
    pub fn new(matrix: &'a AreaMatrix, store: &'a ReferenceDataStore) -> Self {
        Self { matrix, store }
    }

    /// Ratio of a compound row in a sample column
    pub fn ratio(&self, row: usize, sample: usize) -> RatioMeasurement {
        self.measure(row, |r| self.matrix.area(r, sample))
    }

    /// Ratio of a compound row in a measured NIST column
    pub fn reference_ratio(&self, row: usize, column: usize) -> RatioMeasurement {
        self.measure(row, |r| self.matrix.reference_area(r, column))
    }

    fn measure(&self, row: usize, area_of: impl Fn(usize) -> Option<f64>) -> RatioMeasurement {
        let name = self.matrix.compounds().get(row).map(String::as_str).unwrap_or_default();
        let source_area = area_of(row);
        let compound = self.store.compound(name);
        let istd_name = compound.and_then(|c| c.istd_name.clone());
        let istd_row = istd_name.as_deref().and_then(|istd| self.matrix.find_row(istd));
        let istd_area = istd_row.and_then(&area_of);

        let outcome = match (compound, &istd_name) {
            (None, _) => Err(CellError::UnknownCompound {
                compound: name.to_string(),
            }),
            (Some(_), _) if source_area.is_none() => Err(CellError::MissingArea),
            (Some(compound), None) => Err(CellError::IstdNotDeclared {
                compound: compound.name.clone(),
            }),
            (Some(_), Some(istd)) => match (source_area, istd_row, istd_area) {
                (_, None, _) => Err(CellError::MissingIstd { istd: istd.clone() }),
                (Some(area), Some(_), Some(istd_area)) if istd_area != 0.0 => Ok(area / istd_area),
                (_, Some(_), area) => Err(CellError::ZeroIstd {
                    istd: istd.clone(),
                    area,
                }),
            },
        };

        RatioMeasurement {
            source_area,
            istd_name,
            istd_row,
            istd_area,
            outcome,
        }
    }
}
