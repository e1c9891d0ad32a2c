//! Strict hunk parsing for a single file's patch.
//!
//! Unlike the splitter, this parser rejects anything that does not add up:
//! every hunk body must contain exactly the number of old and new lines its
//! header declares. Patch reversal depends on that.

use super::hunk_header::{looks_like_hunk_header, parse_hunk_header};
use crate::model::{DiffLine, Hunk};
use thiserror::Error;

/// Errors that can occur while parsing hunks.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HunkParseError {
    #[error("malformed hunk header at line {line}: {text}")]
    MalformedHeader { line: usize, text: String },
    #[error("hunk starting at line {line} ends early (expected {expected_old} old / {expected_new} new lines)")]
    Truncated {
        line: usize,
        expected_old: u32,
        expected_new: u32,
    },
    #[error("unexpected line {line}: {text}")]
    UnexpectedLine { line: usize, text: String },
}

/// Parse every hunk of a per-file patch.
///
/// Header lines before the first `@@` are skipped. Lines keep a trailing `\r`
/// if the patch has one, so CRLF content compares exactly.
pub fn parse_hunks(patch: &str) -> Result<Vec<Hunk>, HunkParseError> {
    let mut lines: Vec<&str> = patch.split('\n').collect();
    if patch.ends_with('\n') {
        lines.pop();
    }

    let mut idx = lines
        .iter()
        .position(|line| looks_like_hunk_header(line))
        .unwrap_or(lines.len());
    let mut hunks = Vec::new();

    while idx < lines.len() {
        let line = lines[idx];
        if looks_like_hunk_header(line) {
            let (hunk, next) = parse_one(&lines, idx)?;
            hunks.push(hunk);
            idx = next;
        } else if line.trim().is_empty() {
            idx += 1;
        } else {
            return Err(HunkParseError::UnexpectedLine {
                line: idx + 1,
                text: line.to_string(),
            });
        }
    }

    Ok(hunks)
}

fn parse_one(lines: &[&str], header_idx: usize) -> Result<(Hunk, usize), HunkParseError> {
    let header = lines[header_idx];
    let range = parse_hunk_header(header).ok_or_else(|| HunkParseError::MalformedHeader {
        line: header_idx + 1,
        text: header.to_string(),
    })?;

    let mut hunk = Hunk::new(
        range.old_start,
        range.old_count,
        range.new_start,
        range.new_count,
    );
    hunk.header = header.trim_end_matches('\r').to_string();

    let truncated = || HunkParseError::Truncated {
        line: header_idx + 1,
        expected_old: range.old_count,
        expected_new: range.new_count,
    };

    let (mut old_seen, mut new_seen) = (0u32, 0u32);
    let (mut old_no, mut new_no) = (range.old_start, range.new_start);
    let mut idx = header_idx + 1;

    while old_seen < range.old_count || new_seen < range.new_count {
        let Some(&body) = lines.get(idx) else {
            return Err(truncated());
        };
        let old_room = old_seen < range.old_count;
        let new_room = new_seen < range.new_count;

        match body.as_bytes().first() {
            // Blank lines are context whose leading space was stripped.
            Some(b' ') | None if old_room && new_room => {
                hunk.lines
                    .push(DiffLine::context(body.get(1..).unwrap_or(""), old_no, new_no));
                old_seen += 1;
                new_seen += 1;
                old_no += 1;
                new_no += 1;
            }
            Some(b'-') if old_room => {
                hunk.lines.push(DiffLine::deletion(&body[1..], old_no));
                old_seen += 1;
                old_no += 1;
            }
            Some(b'+') if new_room => {
                hunk.lines.push(DiffLine::addition(&body[1..], new_no));
                new_seen += 1;
                new_no += 1;
            }
            Some(b'\\') => mark_missing_newline(&mut hunk),
            _ => return Err(truncated()),
        }
        idx += 1;
    }

    while lines.get(idx).is_some_and(|line| line.starts_with('\\')) {
        mark_missing_newline(&mut hunk);
        idx += 1;
    }

    Ok((hunk, idx))
}

fn mark_missing_newline(hunk: &mut Hunk) {
    if let Some(last) = hunk.lines.last_mut() {
        last.missing_newline = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const PATCH: &str = "diff --git a/f.txt b/f.txt\n--- a/f.txt\n+++ b/f.txt\n@@ -1,3 +1,4 @@ intro\n a\n-b\n+B\n+B2\n c\n@@ -10,2 +11,1 @@\n x\n-y\n";

    #[test]
    fn test_parse_two_hunks() {
        let hunks = parse_hunks(PATCH).unwrap();
        assert_eq!(hunks.len(), 2);
        assert_eq!(hunks[0].header, "@@ -1,3 +1,4 @@ intro");
        assert_eq!(hunks[0].lines.len(), 5);
        assert_eq!(hunks[0].lines[2].new_line, Some(2));
        assert_eq!(hunks[1].lines[1].old_line, Some(11));
    }

    #[test]
    fn test_no_newline_marker() {
        let patch = "@@ -1 +1 @@\n-old\n\\ No newline at end of file\n+new\n";
        let hunks = parse_hunks(patch).unwrap();
        assert!(hunks[0].lines[0].missing_newline);
        assert!(!hunks[0].lines[1].missing_newline);
    }

    #[test]
    fn test_truncated_body_is_rejected() {
        let patch = "@@ -1,3 +1,3 @@\n a\n b\n";
        assert!(matches!(
            parse_hunks(patch),
            Err(HunkParseError::Truncated { line: 1, .. })
        ));
    }

    #[test]
    fn test_overlong_body_is_rejected() {
        let patch = "@@ -1 +1 @@\n a\n b\n";
        assert!(matches!(
            parse_hunks(patch),
            Err(HunkParseError::UnexpectedLine { line: 3, .. })
        ));
    }

    #[test]
    fn test_malformed_header_is_rejected() {
        let patch = "@@ -1,3 +1,4\n a\n";
        assert!(matches!(
            parse_hunks(patch),
            Err(HunkParseError::MalformedHeader { line: 1, .. })
        ));
    }

    #[test]
    fn test_headers_only_yields_no_hunks() {
        let patch = "diff --git a/img.png b/img.png\nBinary files a/img.png and b/img.png differ\n";
        assert!(parse_hunks(patch).unwrap().is_empty());
    }
}
