//! Hunk-range header parsing.
//!
//! Format: `@@ -start[,count] +start[,count] @@ [section]`. An omitted count
//! means 1.

use regex::Regex;
use std::sync::OnceLock;

/// Line ranges declared by a hunk header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HunkRange {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    /// Text after the closing `@@` (function context), trimmed.
    pub section: String,
}

/// Parse a hunk-range header line.
///
/// Returns `None` for anything that is not a well-formed header.
pub fn parse_hunk_header(line: &str) -> Option<HunkRange> {
    static HUNK_REGEX: OnceLock<Regex> = OnceLock::new();

    let re = HUNK_REGEX.get_or_init(|| {
        Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@(.*)$").unwrap()
    });

    let captures = re.captures(line.trim_end_matches(['\r', '\n']))?;
    let number = |idx: usize, default: Option<u32>| -> Option<u32> {
        match captures.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => default,
        }
    };

    Some(HunkRange {
        old_start: number(1, None)?,
        old_count: number(2, Some(1))?,
        new_start: number(3, None)?,
        new_count: number(4, Some(1))?,
        section: captures
            .get(5)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default(),
    })
}

/// Whether a line starts a hunk, well-formed or not.
pub fn looks_like_hunk_header(line: &str) -> bool {
    line.starts_with("@@")
}
