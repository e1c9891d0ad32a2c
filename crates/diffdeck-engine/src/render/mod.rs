//! Turning file records into display lines.
//!
//! Rendering never fails from the caller's point of view: a structured parse
//! is tried first and a line-by-line reading of the raw text is used when it
//! does not work out.

mod full_file;
mod structured;

pub use full_file::render_full_file;
pub use structured::{render_raw, render_structured, RenderError};

use crate::model::{DiffLine, FileDiffRecord};

/// Why a file body is replaced by a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Too many changed lines to render inline.
    LargeDiff { changes: usize },
    /// Binary content.
    Binary,
}

impl Placeholder {
    pub fn message(&self) -> String {
        match self {
            Placeholder::LargeDiff { changes } => {
                format!("Large diff ({} changed lines), press o to open externally", changes)
            }
            Placeholder::Binary => "Binary file not shown".to_string(),
        }
    }
}

/// What to draw below a file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBody {
    Collapsed,
    Placeholder(Placeholder),
    Lines {
        lines: Vec<DiffLine>,
        /// Banner shown above the lines when the diff was malformed.
        warning: Option<String>,
    },
}

impl FileBody {
    /// Number of rows the body occupies, banner included.
    pub fn row_count(&self) -> usize {
        match self {
            FileBody::Collapsed => 0,
            FileBody::Placeholder(_) => 1,
            FileBody::Lines { lines, warning } => {
                lines.len().max(1) + usize::from(warning.is_some())
            }
        }
    }
}

const MALFORMED_WARNING: &str = "Diff could not be fully parsed, showing raw lines";

/// Render a record's diff hunks.
///
/// Malformed records skip the structured parser entirely and are read line
/// by line.
pub fn render_diff(record: &FileDiffRecord) -> FileBody {
    let lines = if record.is_valid {
        match render_structured_guarded(&record.diff_text) {
            Ok(lines) => lines,
            Err(err) => {
                log::warn!("Falling back to raw rendering for {}: {}", record.key, err);
                render_raw(&record.diff_text)
            }
        }
    } else {
        render_raw(&record.diff_text)
    };

    FileBody::Lines {
        lines,
        warning: (!record.is_valid).then(|| MALFORMED_WARNING.to_string()),
    }
}

/// `unidiff` panics on some inputs instead of returning an error.
fn render_structured_guarded(diff_text: &str) -> Result<Vec<DiffLine>, RenderError> {
    std::panic::catch_unwind(|| render_structured(diff_text))
        .unwrap_or(Err(RenderError::Panicked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineKind;
    use crate::parser::split;

    #[test]
    fn test_valid_record_renders_hunks() {
        let records = split(
            "diff --git a/x.txt b/x.txt\n--- a/x.txt\n+++ b/x.txt\n@@ -1,1 +1,2 @@\n line1\n+line2\n",
        );
        let FileBody::Lines { lines, warning } = render_diff(&records[0]) else {
            panic!("expected lines");
        };
        assert!(warning.is_none());
        let kinds: Vec<LineKind> = lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![LineKind::HunkHeader, LineKind::Context, LineKind::Addition]
        );
        assert_eq!(lines[2].new_line, Some(2));
    }

    #[test]
    fn test_invalid_record_gets_banner_and_lines() {
        let records = split("diff --git a/x.txt b/x.txt\n--- a/x.txt\n+++ b/x.txt\n@@ broken\n+added\n");
        assert!(!records[0].is_valid);

        let body = render_diff(&records[0]);
        let FileBody::Lines { lines, warning } = &body else {
            panic!("expected lines");
        };
        assert!(warning.is_some());
        assert!(!lines.is_empty());
        assert!(body.row_count() >= 2);
    }

    #[test]
    fn test_out_of_order_headers_render_raw() {
        let records = split("diff --git a/a.rs b/a.rs\n+++ b/a.rs\n--- a/a.rs\n@@ -1 +1 @@\n-x\n+y\n");
        assert!(!records[0].is_valid);

        let FileBody::Lines { lines, warning } = render_diff(&records[0]) else {
            panic!("expected lines");
        };
        assert!(warning.is_some());
        let kinds: Vec<LineKind> = lines.iter().map(|l| l.kind).collect();
        assert_eq!(
            kinds,
            vec![LineKind::HunkHeader, LineKind::Deletion, LineKind::Addition]
        );
    }

    #[test]
    fn test_oversized_hunk_numbers_render_raw() {
        let records = split(
            "diff --git a/a.rs b/a.rs\n--- a/a.rs\n+++ b/a.rs\n@@ -99999999999999999999999 +1 @@\n-x\n+y\n",
        );
        assert!(!records[0].is_valid);

        let FileBody::Lines { lines, warning } = render_diff(&records[0]) else {
            panic!("expected lines");
        };
        assert!(warning.is_some());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].old_line, None);
        assert_eq!(lines[2].new_line, None);
    }

    #[test]
    fn test_parser_panic_falls_back() {
        // Marked valid, so the structured parser is tried and panics on it
        let record = FileDiffRecord {
            key: "a.rs->a.rs".to_string(),
            old_path: "a.rs".to_string(),
            new_path: "a.rs".to_string(),
            diff_text: "diff --git a/a.rs b/a.rs\n+++ b/a.rs\n--- a/a.rs\n@@ -1 +1 @@\n-x\n+y\n"
                .to_string(),
            is_binary: false,
            additions: 1,
            deletions: 1,
            is_valid: true,
        };
        let FileBody::Lines { lines, warning } = render_diff(&record) else {
            panic!("expected lines");
        };
        assert!(warning.is_none());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].kind, LineKind::Addition);
    }

    #[test]
    fn test_placeholder_messages() {
        assert!(Placeholder::LargeDiff { changes: 4200 }
            .message()
            .contains("4200"));
        assert_eq!(FileBody::Placeholder(Placeholder::Binary).row_count(), 1);
    }
}
