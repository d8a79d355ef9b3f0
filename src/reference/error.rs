use crate::error::{join_issues, InputIssue};
use crate::grouping::Slot;
use crate::matrix::RangePattern;

/// Errors that can occur while loading the reference tables
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReferenceDataError {
    /// Missing columns, unparsable keys, duplicate compounds or entries.
    /// Integrity issues found in the same pass are appended.
    #[error("reference tables are malformed ({} issue(s)): {}", .0.len(), join_issues(.0))]
    Structural(Vec<InputIssue>),

    /// A compound's concentration or response factor is absent or invalid
    #[error("reference integrity error ({} issue(s)): {}", .0.len(), join_issues(.0))]
    Integrity(Vec<InputIssue>),
}

impl ReferenceDataError {
    /// Every issue carried by this error
    pub fn issues(&self) -> &[InputIssue] {
        match self {
            ReferenceDataError::Structural(issues) | ReferenceDataError::Integrity(issues) => issues,
        }
    }
}

/// No NIST reference ratio exists for a (compound, pattern, slot) triple.
///
/// Recoverable: it fails one cell, never the run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize)]
#[error("no NIST reference ratio for compound '{compound}' in pattern {pattern} slot {slot}")]
pub struct MissingReferenceError {
    /// Compound the ratio was requested for
    pub compound: String,
    /// Reference family
    pub pattern: RangePattern,
    /// Slot within the family
    pub slot: Slot,
}
