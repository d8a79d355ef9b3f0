use crate::error::{join_issues, InputIssue};

/// The uploaded workbook failed validation.
///
/// Validation is not fail-fast: `issues` lists every offending row and column
/// so the whole file can be fixed in one pass.
#[derive(Debug, Clone, thiserror::Error)]
#[error("malformed workbook ({} issue(s)): {}", .issues.len(), join_issues(.issues))]
pub struct MalformedInputError {
    /// Every problem found, in row-major order
    pub issues: Vec<InputIssue>,
}
