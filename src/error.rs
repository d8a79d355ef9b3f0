//! Run-level error types shared by the input validators and the engine.

use std::fmt;

use serde::Serialize;

/// Where a structural problem was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueLocation {
    /// Table the problem belongs to (e.g. "workbook", "compound index")
    pub table: String,
    /// 1-based data row, when the problem is tied to a row
    pub row: Option<usize>,
    /// Column header, when the problem is tied to a column
    pub column: Option<String>,
}

impl IssueLocation {
    /// Location covering a whole table
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            row: None,
            column: None,
        }
    }

    /// Narrow the location to a data row
    pub fn row(mut self, row: usize) -> Self {
        self.row = Some(row);
        self
    }

    /// Narrow the location to a column
    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl fmt::Display for IssueLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.table)?;
        if let Some(row) = self.row {
            write!(f, " row {}", row)?;
        }
        if let Some(column) = &self.column {
            write!(f, " column '{}'", column)?;
        }
        Ok(())
    }
}

/// A single structural or integrity problem in one of the input tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputIssue {
    /// Where the problem was found
    pub location: IssueLocation,
    /// Human-readable description
    pub message: String,
}

impl InputIssue {
    /// Create an issue at the given location
    pub fn new(location: IssueLocation, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for InputIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

pub(crate) fn join_issues(issues: &[InputIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Fatal errors that abort a run before any calculation record is created.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Malformed workbook shape, unreadable reference table, duplicate compound names
    #[error("structural input error ({} issue(s)): {}", .0.len(), join_issues(.0))]
    StructuralInput(Vec<InputIssue>),

    /// Concentration or response factor absent in the compound index
    #[error("reference integrity error ({} issue(s)): {}", .0.len(), join_issues(.0))]
    ReferenceIntegrity(Vec<InputIssue>),

    /// The run-wide Agilent coefficient is not a positive finite number
    #[error("invalid coefficient {0}: must be a positive finite number")]
    InvalidCoefficient(f64),

    /// The row-to-slot layout cannot assign rows
    #[error("invalid slot layout: {0}")]
    InvalidSlotLayout(String),

    /// A record could not be appended to the ledger
    #[error(transparent)]
    Ledger(#[from] crate::ledger::LedgerError),
}

impl RunError {
    /// Every issue carried by this error, in detection order
    pub fn issues(&self) -> Vec<InputIssue> {
        match self {
            RunError::StructuralInput(issues) | RunError::ReferenceIntegrity(issues) => {
                issues.clone()
            }
            RunError::InvalidCoefficient(value) => vec![InputIssue::new(
                IssueLocation::table("settings").column("coefficient"),
                format!("coefficient {} must be a positive finite number", value),
            )],
            RunError::InvalidSlotLayout(message) => vec![InputIssue::new(
                IssueLocation::table("settings").column("slot_layout"),
                message.clone(),
            )],
            RunError::Ledger(error) => vec![InputIssue::new(
                IssueLocation::table("ledger"),
                error.to_string(),
            )],
        }
    }
}

impl From<crate::matrix::MalformedInputError> for RunError {
    fn from(error: crate::matrix::MalformedInputError) -> Self {
        RunError::StructuralInput(error.issues)
    }
}

impl From<crate::reference::ReferenceDataError> for RunError {
    fn from(error: crate::reference::ReferenceDataError) -> Self {
        use crate::reference::ReferenceDataError;
        match error {
            ReferenceDataError::Integrity(issues) => RunError::ReferenceIntegrity(issues),
            ReferenceDataError::Structural(issues) => RunError::StructuralInput(issues),
        }
    }
}
