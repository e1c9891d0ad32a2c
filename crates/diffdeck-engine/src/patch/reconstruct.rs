//! Reverse-apply a per-file patch to recover the old file content.
//!
//! Application is exact: hunks must appear in order, must not overlap, and
//! every context or removed line must match the source verbatim. Anything
//! else fails closed.

use crate::model::{Hunk, LineKind};
use crate::parser::{parse_hunks, HunkParseError};
use thiserror::Error;

/// Errors that can occur while reconstructing old content.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReconstructError {
    #[error("patch is unparseable: {0}")]
    Unparseable(#[from] HunkParseError),
    #[error("patch contains no hunks")]
    NoHunks,
    #[error("hunk {hunk} starts at line {start}, past the end of the content ({len} lines)")]
    OutOfRange { hunk: usize, start: usize, len: usize },
    #[error("hunk {hunk} overlaps the previous hunk")]
    Overlap { hunk: usize },
    #[error("hunk {hunk} does not apply at line {line}: expected {expected:?}, found {found:?}")]
    Mismatch {
        hunk: usize,
        line: usize,
        expected: String,
        found: Option<String>,
    },
}

/// Recover the content a patch was made against, given the content it produced.
pub fn reconstruct_old_content(new_content: &str, patch: &str) -> Result<String, ReconstructError> {
    let hunks = parse_hunks(patch)?;
    if hunks.is_empty() {
        return Err(ReconstructError::NoHunks);
    }

    let reversed: Vec<Hunk> = hunks.iter().map(Hunk::reversed).collect();
    apply_hunks(new_content, &reversed)
}

/// Where the last emitted line came from, for trailing-newline bookkeeping.
enum LastLine {
    None,
    Source { at_end: bool },
    Hunk { missing_newline: bool },
}

/// Apply hunks (old side = `source`) and return the new side.
pub fn apply_hunks(source: &str, hunks: &[Hunk]) -> Result<String, ReconstructError> {
    let source_lines = content_lines(source);
    let source_has_newline = source.ends_with('\n');

    let mut out: Vec<&str> = Vec::with_capacity(source_lines.len());
    let mut last = LastLine::None;
    let mut cursor = 0usize;

    for (idx, hunk) in hunks.iter().enumerate() {
        let number = idx + 1;
        let start = if hunk.old_count == 0 {
            hunk.old_start as usize
        } else {
            (hunk.old_start as usize)
                .checked_sub(1)
                .ok_or(ReconstructError::OutOfRange {
                    hunk: number,
                    start: 0,
                    len: source_lines.len(),
                })?
        };

        if start > source_lines.len() {
            return Err(ReconstructError::OutOfRange {
                hunk: number,
                start: hunk.old_start as usize,
                len: source_lines.len(),
            });
        }
        if start < cursor {
            return Err(ReconstructError::Overlap { hunk: number });
        }

        if start > cursor {
            out.extend_from_slice(&source_lines[cursor..start]);
            last = LastLine::Source {
                at_end: start == source_lines.len(),
            };
        }

        let mut pos = start;
        for line in &hunk.lines {
            match line.kind {
                LineKind::Context => {
                    expect_line(&source_lines, pos, &line.content, number)?;
                    out.push(source_lines[pos]);
                    pos += 1;
                    last = LastLine::Hunk {
                        missing_newline: line.missing_newline,
                    };
                }
                LineKind::Deletion => {
                    expect_line(&source_lines, pos, &line.content, number)?;
                    pos += 1;
                }
                LineKind::Addition => {
                    out.push(&line.content);
                    last = LastLine::Hunk {
                        missing_newline: line.missing_newline,
                    };
                }
                LineKind::HunkHeader => {}
            }
        }
        cursor = pos;
    }

    if cursor < source_lines.len() {
        out.extend_from_slice(&source_lines[cursor..]);
        last = LastLine::Source { at_end: true };
    }

    if out.is_empty() {
        return Ok(String::new());
    }

    let trailing_newline = match last {
        LastLine::None => source_has_newline,
        LastLine::Source { at_end } => !at_end || source_has_newline,
        LastLine::Hunk { missing_newline } => !missing_newline,
    };

    let mut result = out.join("\n");
    if trailing_newline {
        result.push('\n');
    }
    Ok(result)
}

fn expect_line(
    source: &[&str],
    pos: usize,
    expected: &str,
    hunk: usize,
) -> Result<(), ReconstructError> {
    match source.get(pos) {
        Some(found) if *found == expected => Ok(()),
        found => Err(ReconstructError::Mismatch {
            hunk,
            line: pos + 1,
            expected: expected.to_string(),
            found: found.map(|s| s.to_string()),
        }),
    }
}

fn content_lines(content: &str) -> Vec<&str> {
    if content.is_empty() {
        return Vec::new();
    }
    content
        .strip_suffix('\n')
        .unwrap_or(content)
        .split('\n')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use similar::TextDiff;

    fn make_patch(old: &str, new: &str) -> String {
        let diff = TextDiff::from_lines(old, new);
        let body = diff
            .unified_diff()
            .context_radius(3)
            .header("a/f.txt", "b/f.txt")
            .to_string();
        format!("diff --git a/f.txt b/f.txt\n{}", body)
    }

    fn assert_round_trip(old: &str, new: &str) {
        let patch = make_patch(old, new);
        assert_eq!(reconstruct_old_content(new, &patch).unwrap(), old, "patch:\n{}", patch);
    }

    #[test]
    fn test_round_trip_modification() {
        assert_round_trip("a\nb\nc\n", "a\nB\nc\nd\n");
    }

    #[test]
    fn test_round_trip_added_and_deleted_files() {
        assert_round_trip("", "x\ny\n");
        assert_round_trip("x\ny\n", "");
    }

    #[test]
    fn test_round_trip_multiple_hunks() {
        let old: String = (1..=40).map(|n| format!("line {}\n", n)).collect();
        let new = old
            .replace("line 2\n", "line two\n")
            .replace("line 35\n", "line 35\nline 35.5\n");
        let patch = make_patch(&old, &new);
        assert_eq!(parse_hunks(&patch).unwrap().len(), 2);
        assert_eq!(reconstruct_old_content(&new, &patch).unwrap(), old);
    }

    #[test]
    fn test_round_trip_missing_trailing_newline() {
        assert_round_trip("a\nb", "a\nb\nc\n");
        assert_round_trip("a\nb\n", "a\nc");
    }

    #[test]
    fn test_hand_written_patch() {
        let patch = "diff --git a/x.txt b/x.txt\n--- a/x.txt\n+++ b/x.txt\n@@ -1,1 +1,2 @@\n line1\n+line2\n";
        assert_eq!(
            reconstruct_old_content("line1\nline2\n", patch).unwrap(),
            "line1\n"
        );
    }

    #[test]
    fn test_truncated_hunk_header_fails() {
        let patch = "--- a/x.txt\n+++ b/x.txt\n@@ -1,1 +1,2\n line1\n+line2\n";
        assert!(matches!(
            reconstruct_old_content("line1\nline2\n", patch),
            Err(ReconstructError::Unparseable(_))
        ));
    }

    #[test]
    fn test_patch_without_hunks_fails() {
        let patch = "diff --git a/a.png b/a.png\nBinary files a/a.png and b/a.png differ\n";
        assert_eq!(
            reconstruct_old_content("", patch),
            Err(ReconstructError::NoHunks)
        );
    }

    #[test]
    fn test_mismatched_content_fails() {
        let patch = make_patch("a\nb\nc\n", "a\nB\nc\n");
        let err = reconstruct_old_content("a\nX\nc\n", &patch).unwrap_err();
        assert!(matches!(err, ReconstructError::Mismatch { hunk: 1, .. }));
    }

    #[test]
    fn test_hunk_past_end_fails() {
        let patch = "@@ -10,1 +10,1 @@\n-a\n+b\n";
        assert!(matches!(
            reconstruct_old_content("b\n", patch),
            Err(ReconstructError::OutOfRange { hunk: 1, .. })
        ));
    }

    #[test]
    fn test_overlapping_hunks_fail() {
        let patch = "@@ -1,2 +1,2 @@\n a\n-b\n+B\n@@ -1,1 +1,1 @@\n-a\n+A\n";
        assert!(matches!(
            reconstruct_old_content("a\nB\n", patch),
            Err(ReconstructError::Overlap { hunk: 2 })
        ));
    }
}
