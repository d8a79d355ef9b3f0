use log::trace;

use crate::grouping::SampleGroupResolver;
use crate::ledger::{CalculationRecord, NistReferenceUsed, ReferenceSource};

use super::measured::MeasuredReferences;
use super::CellError;

/// Divides a cell ratio by the NIST reference ratio of its (pattern, slot)
#[derive(Debug, Clone, Copy)]
pub struct NistNormalizer<'a> {
    resolver: SampleGroupResolver<'a>,
    fallback: Option<&'a MeasuredReferences>,
}

impl<'a> NistNormalizer<'a> {
    /// Normaliser using the ratio table only
    pub fn new(resolver: SampleGroupResolver<'a>) -> Self {
        Self {
            resolver,
            fallback: None,
        }
    }

    /// Fall back to measured `NIST_` columns when the ratio table has no entry
    pub fn with_fallback(mut self, measured: &'a MeasuredReferences) -> Self {
        self.fallback = Some(measured);
        self
    }

    /// Fill the NIST part of a record whose ratio step has run.
    ///
    /// Does nothing when the ratio is unavailable. A reference ratio that is
    /// absent, zero, negative or not finite is recorded as a cell error.
    pub fn normalize(&self, record: &mut CalculationRecord) {
        let Some(ratio) = record.ratio else {
            return;
        };

        let reference = match self
            .resolver
            .reference_ratio(&record.compound, record.pattern, record.slot)
        {
            Ok(found) => NistReferenceUsed {
                pattern: found.pattern,
                pattern_source: record.pattern_source,
                slot: found.slot,
                value: found.value,
                source: ReferenceSource::Table,
            },
            Err(missing) => {
                let measured = self.fallback.and_then(|m| {
                    m.lookup(record.row_index.saturating_sub(1), record.pattern, record.slot)
                });
                match measured {
                    Some((value, column)) => NistReferenceUsed {
                        pattern: record.pattern,
                        pattern_source: record.pattern_source,
                        slot: record.slot,
                        value,
                        source: ReferenceSource::MeasuredColumn {
                            column: column.header.clone(),
                        },
                    },
                    None => {
                        record.errors.push(CellError::MissingReference(missing));
                        return;
                    }
                }
            }
        };

        let value = reference.value;
        if value > 0.0 && value.is_finite() {
            record.nist_result = Some(ratio / value);
            trace!(
                "{} / {}: {} / {} = {:?}",
                record.compound,
                record.sample,
                ratio,
                value,
                record.nist_result
            );
        } else {
            record.errors.push(CellError::InvalidReference {
                pattern: reference.pattern,
                slot: reference.slot,
                value,
            });
        }
        record.nist_reference_used = Some(reference);
    }
}
