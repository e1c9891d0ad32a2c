//! Split a multi-file unified diff into per-file records.
//!
//! A file section starts at a `diff --git ` marker and runs until the next
//! marker. Each section becomes one [`FileDiffRecord`], validated structurally
//! but otherwise kept verbatim so renderers can degrade gracefully.

use super::hunk_header::{looks_like_hunk_header, parse_hunk_header};
use crate::model::FileDiffRecord;

const FILE_MARKER: &str = "diff --git ";

/// Header lines that make a section meaningful without any hunk.
const NO_HUNK_MARKERS: &[&str] = &[
    "Binary files ",
    "GIT binary patch",
    "old mode ",
    "new mode ",
    "new file mode ",
    "deleted file mode ",
    "rename from ",
    "rename to ",
    "copy from ",
    "copy to ",
    "similarity index ",
];

/// Split a diff blob into per-file records, preserving input order.
///
/// Records whose paths could not be derived carry a synthetic key (see
/// [`FileDiffRecord::has_real_paths`]); consumers filter those out.
pub fn split(diff_blob: &str) -> Vec<FileDiffRecord> {
    let records: Vec<FileDiffRecord> = split_blocks(diff_blob)
        .into_iter()
        .enumerate()
        .map(|(ordinal, block)| build_record(ordinal, block))
        .collect();

    log::debug!(
        "split diff blob ({} bytes) into {} file sections",
        diff_blob.len(),
        records.len()
    );
    records
}

fn split_blocks(blob: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Option<String> = None;
    let mut saw_marker = false;

    for line in blob.split_inclusive('\n') {
        if line.starts_with(FILE_MARKER) {
            saw_marker = true;
            if let Some(block) = current.take() {
                push_retained(&mut blocks, block);
            }
            current = Some(line.to_string());
        } else if let Some(block) = current.as_mut() {
            block.push_str(line);
        }
        // Anything before the first marker is preamble (e.g. a commit message).
    }

    if let Some(block) = current.take() {
        push_retained(&mut blocks, block);
    }

    // Plain `diff -u` output has no git marker; treat it as one section.
    if !saw_marker && is_plain_unified_diff(blob) {
        blocks.push(blob.to_string());
    }

    blocks
}

/// Keep a block only if something follows its marker line.
fn push_retained(blocks: &mut Vec<String>, block: String) {
    if block.lines().skip(1).any(|line| !line.trim().is_empty()) {
        blocks.push(block);
    }
}

fn is_plain_unified_diff(blob: &str) -> bool {
    blob.lines()
        .any(|line| line.starts_with("--- ") || looks_like_hunk_header(line))
}

fn build_record(ordinal: usize, diff_text: String) -> FileDiffRecord {
    let lines: Vec<&str> = diff_text.lines().collect();
    let header_end = lines
        .iter()
        .position(|line| looks_like_hunk_header(line))
        .unwrap_or(lines.len());
    let (header, body) = lines.split_at(header_end);

    let paths = header_paths(header)
        .or_else(|| rename_paths(header))
        .or_else(|| header.first().and_then(|line| marker_paths(line)));

    let key = match &paths {
        Some((old, new)) if !old.is_empty() || !new.is_empty() => {
            FileDiffRecord::key_for(old, new)
        }
        _ => FileDiffRecord::synthetic_key(ordinal),
    };
    let (old_path, new_path) = paths.unwrap_or_default();

    let is_binary = lines
        .iter()
        .any(|line| line.starts_with("Binary files ") || line.starts_with("GIT binary patch"));

    let (additions, deletions) = count_changes(body);
    let is_valid = is_structurally_valid(&diff_text, header, body);

    if !is_valid {
        log::debug!("file section {} ({}) is not a well-formed patch", ordinal, key);
    }

    FileDiffRecord {
        key,
        old_path,
        new_path,
        diff_text,
        is_binary,
        additions,
        deletions,
        is_valid,
    }
}

/// Paths from the `---` / `+++` header pair.
fn header_paths(header: &[&str]) -> Option<(String, String)> {
    let old = header.iter().find_map(|line| line.strip_prefix("--- "))?;
    let new = header.iter().find_map(|line| line.strip_prefix("+++ "))?;
    Some((clean_path(old), clean_path(new)))
}

/// Paths from `rename from`/`rename to` (or `copy from`/`copy to`).
fn rename_paths(header: &[&str]) -> Option<(String, String)> {
    let find = |prefixes: [&str; 2]| {
        header.iter().find_map(|line| {
            prefixes
                .iter()
                .find_map(|prefix| line.strip_prefix(prefix))
                .map(clean_path)
        })
    };
    let old = find(["rename from ", "copy from "])?;
    let new = find(["rename to ", "copy to "])?;
    Some((old, new))
}

/// Paths from the `diff --git a/X b/Y` marker itself.
fn marker_paths(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix(FILE_MARKER)?.trim_end();

    if let Some(quoted) = rest.strip_prefix('"') {
        // "a/x y" "b/x y"
        let (old, tail) = quoted.split_once('"')?;
        let new = tail.trim_start().strip_prefix('"')?.strip_suffix('"')?;
        return Some((clean_path(old), clean_path(new)));
    }

    let split_at = rest.find(" b/")?;
    let (old, new) = rest.split_at(split_at);
    Some((clean_path(old), clean_path(new)))
}

/// Clean the path by removing a/b prefixes and trailing timestamps.
fn clean_path(path: &str) -> String {
    let path = path.split('\t').next().unwrap_or_default().trim();
    let path = path.trim_matches('"');

    if let Some(stripped) = path.strip_prefix("a/") {
        return stripped.to_string();
    }
    if let Some(stripped) = path.strip_prefix("b/") {
        return stripped.to_string();
    }

    path.to_string()
}

/// Count `+`/`-` content lines inside hunks.
fn count_changes(body: &[&str]) -> (usize, usize) {
    body.iter()
        .filter(|line| !looks_like_hunk_header(line))
        .fold((0, 0), |(adds, dels), line| match line.as_bytes().first() {
            Some(b'+') => (adds + 1, dels),
            Some(b'-') => (adds, dels + 1),
            _ => (adds, dels),
        })
}

fn is_structurally_valid(text: &str, header: &[&str], body: &[&str]) -> bool {
    if text.trim().is_empty() {
        return false;
    }

    let has_hunks = !body.is_empty();
    if !has_hunks
        && header
            .iter()
            .any(|line| NO_HUNK_MARKERS.iter().any(|marker| line.starts_with(marker)))
    {
        return true;
    }

    let old_idx = header.iter().position(|line| line.starts_with("--- "));
    let new_idx = header.iter().position(|line| line.starts_with("+++ "));
    let (Some(old_idx), Some(new_idx)) = (old_idx, new_idx) else {
        return false;
    };
    if new_idx < old_idx {
        return false;
    }

    body.iter().any(|line| parse_hunk_header(line).is_some())
}
