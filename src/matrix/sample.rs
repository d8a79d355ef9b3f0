use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Width of a sample range block
pub const RANGE_BLOCK_WIDTH: u64 = 100;

/// Prefix of workbook columns holding measured NIST standard injections
pub const NIST_COLUMN_PREFIX: &str = "NIST_";

/// A sample column identifier of the form `<cohort>_<digits>`, e.g. `PH-HC_5712`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SampleId {
    /// Full identifier as it appears in the workbook header
    pub identifier: String,
    /// Part before the last underscore (`PH-HC`)
    pub cohort: String,
    /// Trailing integer (`5712`)
    pub numeric_suffix: u64,
}

impl SampleId {
    /// Parse an identifier, returning `None` when it does not match `<cohort>_<digits>`
    /// or when the suffix has no enclosing range block.
    pub fn parse(identifier: &str) -> Option<Self> {
        let identifier = identifier.trim();
        let (cohort, digits) = split_identifier(identifier)?;
        let numeric_suffix = digits.parse().ok()?;
        RangePattern::checked_for_suffix(numeric_suffix)?;
        Some(Self {
            identifier: identifier.to_string(),
            cohort: cohort.to_string(),
            numeric_suffix,
        })
    }

    /// The hundred-wide block enclosing this sample's suffix
    pub fn range_block(&self) -> RangePattern {
        RangePattern::for_suffix(self.numeric_suffix)
    }

    /// True when the text has the `<cohort>_<digits>` shape but its suffix is
    /// too large to place in a range block
    pub fn has_oversized_suffix(identifier: &str) -> bool {
        split_identifier(identifier.trim()).is_some_and(|(_, digits)| {
            digits
                .parse::<u64>()
                .ok()
                .and_then(RangePattern::checked_for_suffix)
                .is_none()
        })
    }
}

fn split_identifier(identifier: &str) -> Option<(&str, &str)> {
    let (cohort, digits) = identifier.rsplit_once('_')?;
    if cohort.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((cohort, digits))
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}

/// A NIST reference family label such as `5700-5800`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RangePattern {
    /// Inclusive block start
    pub start: u64,
    /// Block end (the next block's start)
    pub end: u64,
}

impl RangePattern {
    /// Block for a numeric suffix: `floor(suffix / 100) * 100` to `+100`.
    ///
    /// The end saturates for suffixes in the last, incomplete block; use
    /// [`RangePattern::checked_for_suffix`] to reject those.
    pub fn for_suffix(suffix: u64) -> Self {
        let start = (suffix / RANGE_BLOCK_WIDTH) * RANGE_BLOCK_WIDTH;
        Self {
            start,
            end: start.saturating_add(RANGE_BLOCK_WIDTH),
        }
    }

    /// Block for a numeric suffix, `None` when the block end does not fit in a `u64`
    pub fn checked_for_suffix(suffix: u64) -> Option<Self> {
        let start = (suffix / RANGE_BLOCK_WIDTH) * RANGE_BLOCK_WIDTH;
        let end = start.checked_add(RANGE_BLOCK_WIDTH)?;
        Some(Self { start, end })
    }
}

impl fmt::Display for RangePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for RangePattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| format!("pattern '{}' is not of the form <start>-<end>", s))?;
        let start: u64 = start
            .trim()
            .parse()
            .map_err(|_| format!("pattern '{}' has a non-numeric start", s))?;
        let end: u64 = end
            .trim()
            .parse()
            .map_err(|_| format!("pattern '{}' has a non-numeric end", s))?;
        if end <= start {
            return Err(format!("pattern '{}' ends before it starts", s));
        }
        Ok(Self { start, end })
    }
}

impl From<RangePattern> for String {
    fn from(pattern: RangePattern) -> Self {
        pattern.to_string()
    }
}

impl TryFrom<String> for RangePattern {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A measured NIST standard column header such as `NIST_5700-5800 (2)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ReferenceColumnId {
    /// Header text as it appears in the workbook
    pub header: String,
    /// Reference family the column belongs to
    pub pattern: RangePattern,
    /// 1-based slot number within the family
    pub slot: u32,
}

impl ReferenceColumnId {
    /// Parse `NIST_<start>-<end> (<slot>)`; the space before the slot is optional
    pub fn parse(header: &str) -> Option<Self> {
        let header = header.trim();
        let rest = header.strip_prefix(NIST_COLUMN_PREFIX)?;
        let open = rest.find('(')?;
        let close = rest.rfind(')')?;
        if close < open || close != rest.len() - 1 {
            return None;
        }
        let pattern = rest[..open].trim().parse().ok()?;
        let slot = rest[open + 1..close].trim().parse().ok()?;
        Some(Self {
            header: header.to_string(),
            pattern,
            slot,
        })
    }
}
