use crate::model::{DiffLine, LineKind};
use crate::parser::parse_hunk_header;
use thiserror::Error;
use unidiff::{Line as UnidiffLine, PatchSet};

/// Errors from the structured renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to parse diff: {0}")]
    ParseFailed(String),
    #[error("Diff contains no file")]
    NoFile,
    #[error("Diff contains no hunks")]
    NoHunks,
    #[error("Diff parser panicked")]
    Panicked,
}

/// Render hunks through a full unified-diff parser.
pub fn render_structured(diff_text: &str) -> Result<Vec<DiffLine>, RenderError> {
    let mut patch_set = PatchSet::new();
    patch_set
        .parse(diff_text)
        .map_err(|e| RenderError::ParseFailed(e.to_string()))?;

    let file = patch_set.files().first().ok_or(RenderError::NoFile)?;
    if file.hunks().is_empty() {
        return Err(RenderError::NoHunks);
    }

    let mut lines = Vec::new();
    for hunk in file.hunks() {
        let mut header = format!(
            "@@ -{},{} +{},{} @@",
            hunk.source_start, hunk.source_length, hunk.target_start, hunk.target_length
        );
        if !hunk.section_header.is_empty() {
            header.push(' ');
            header.push_str(hunk.section_header.trim());
        }
        lines.push(DiffLine::hunk_header(header));

        for line in hunk.lines() {
            push_line(&mut lines, line);
        }
    }
    Ok(lines)
}

fn push_line(lines: &mut Vec<DiffLine>, line: &UnidiffLine) {
    let kind = match line.line_type.as_str() {
        "+" => LineKind::Addition,
        "-" => LineKind::Deletion,
        "\\" => {
            if let Some(previous) = lines.last_mut() {
                previous.missing_newline = true;
            }
            return;
        }
        _ => LineKind::Context,
    };
    lines.push(DiffLine {
        kind,
        content: line.value.trim_end_matches(['\r', '\n']).to_string(),
        old_line: line.source_line_no.map(|n| n as u32),
        new_line: line.target_line_no.map(|n| n as u32),
        missing_newline: false,
    });
}

/// Line-by-line rendering straight from the diff text.
///
/// Never fails. Lines before the first hunk header are skipped; if the text
/// has no hunk at all, every line is shown as-is.
pub fn render_raw(diff_text: &str) -> Vec<DiffLine> {
    let mut lines: Vec<DiffLine> = Vec::new();
    let mut in_hunk = false;
    let mut old_line: Option<u32> = None;
    let mut new_line: Option<u32> = None;

    for raw in diff_text.lines() {
        if raw.starts_with("@@") {
            in_hunk = true;
            let range = parse_hunk_header(raw);
            old_line = range.as_ref().map(|r| r.old_start);
            new_line = range.as_ref().map(|r| r.new_start);
            lines.push(DiffLine::hunk_header(raw));
            continue;
        }
        if !in_hunk {
            continue;
        }

        let (kind, content) = match raw.chars().next() {
            Some('+') => (LineKind::Addition, &raw[1..]),
            Some('-') => (LineKind::Deletion, &raw[1..]),
            Some(' ') => (LineKind::Context, &raw[1..]),
            Some('\\') => {
                if let Some(previous) = lines.last_mut() {
                    previous.missing_newline = true;
                }
                continue;
            }
            _ => (LineKind::Context, raw),
        };

        let line = DiffLine {
            kind,
            content: content.to_string(),
            old_line: (kind != LineKind::Addition).then_some(old_line).flatten(),
            new_line: (kind != LineKind::Deletion).then_some(new_line).flatten(),
            missing_newline: false,
        };
        if kind != LineKind::Addition {
            old_line = old_line.map(|n| n.saturating_add(1));
        }
        if kind != LineKind::Deletion {
            new_line = new_line.map(|n| n.saturating_add(1));
        }
        lines.push(line);
    }

    if lines.is_empty() {
        lines = diff_text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| DiffLine {
                kind: LineKind::Context,
                content: l.to_string(),
                old_line: None,
                new_line: None,
                missing_newline: false,
            })
            .collect();
    }
    lines
}
