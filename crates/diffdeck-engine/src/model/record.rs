//! Per-file diff records and aggregate statistics.

use ratatui::style::Color;

/// Path used by unified diffs for the missing side of an added or deleted file.
pub const DEV_NULL: &str = "/dev/null";

/// Prefix of keys given to blocks whose paths could not be parsed.
pub const SYNTHETIC_KEY_PREFIX: &str = "unparsed#";

/// One file's section of a multi-file unified diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiffRecord {
    /// Stable identity within a diff set: `"{old_path}->{new_path}"`.
    pub key: String,
    /// Path before the change (`/dev/null` for added files).
    pub old_path: String,
    /// Path after the change (`/dev/null` for deleted files).
    pub new_path: String,
    /// Raw diff text of this file section, line terminators included.
    pub diff_text: String,
    /// Whether the section carries a binary marker.
    pub is_binary: bool,
    /// Number of `+` content lines inside hunks.
    pub additions: usize,
    /// Number of `-` content lines inside hunks.
    pub deletions: usize,
    /// Whether path and hunk-range headers form a well-formed patch.
    pub is_valid: bool,
}

impl FileDiffRecord {
    /// Build the record key from its two paths.
    pub fn key_for(old_path: &str, new_path: &str) -> String {
        format!("{}->{}", old_path, new_path)
    }

    /// Key for a block whose paths could not be derived.
    pub fn synthetic_key(ordinal: usize) -> String {
        format!("{}{}", SYNTHETIC_KEY_PREFIX, ordinal)
    }

    /// Whether the key was derived from real paths.
    ///
    /// Records failing this are parse failures and must not be shown as files.
    pub fn has_real_paths(&self) -> bool {
        !self.key.starts_with(SYNTHETIC_KEY_PREFIX)
    }

    /// The path to show and to act on (new path, or old path for deletions).
    pub fn display_path(&self) -> &str {
        if self.new_path == DEV_NULL || self.new_path.is_empty() {
            &self.old_path
        } else {
            &self.new_path
        }
    }

    /// Display name, including the rename arrow when paths differ.
    pub fn display_name(&self) -> String {
        match self.status() {
            FileStatus::Renamed => format!("{} → {}", self.old_path, self.new_path),
            _ => self.display_path().to_string(),
        }
    }

    /// Total number of changed lines.
    pub fn change_count(&self) -> usize {
        self.additions + self.deletions
    }

    /// File status derived from the two paths.
    pub fn status(&self) -> FileStatus {
        if self.old_path == DEV_NULL {
            FileStatus::Added
        } else if self.new_path == DEV_NULL {
            FileStatus::Deleted
        } else if self.old_path != self.new_path {
            FileStatus::Renamed
        } else {
            FileStatus::Modified
        }
    }

    /// Whether either path ends with the given suffix.
    pub fn matches_suffix(&self, suffix: &str) -> bool {
        self.new_path.ends_with(suffix) || self.old_path.ends_with(suffix)
    }
}

/// File status in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

impl FileStatus {
    /// Get a single-character representation.
    pub fn as_char(&self) -> char {
        match self {
            FileStatus::Added => 'A',
            FileStatus::Modified => 'M',
            FileStatus::Deleted => 'D',
            FileStatus::Renamed => 'R',
        }
    }

    /// Get the status color.
    pub fn color(&self) -> Color {
        match self {
            FileStatus::Added => Color::Green,
            FileStatus::Modified => Color::Yellow,
            FileStatus::Deleted => Color::Red,
            FileStatus::Renamed => Color::Cyan,
        }
    }
}

/// Summary of the unfiltered record set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub file_count: usize,
    pub additions: usize,
    pub deletions: usize,
    pub is_loading: bool,
    pub has_changes: bool,
}

impl DiffStats {
    /// Aggregate statistics over a record set.
    pub fn from_records(records: &[FileDiffRecord], is_loading: bool) -> Self {
        let additions = records.iter().map(|r| r.additions).sum();
        let deletions = records.iter().map(|r| r.deletions).sum();
        Self {
            file_count: records.len(),
            additions,
            deletions,
            is_loading,
            has_changes: !records.is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(old: &str, new: &str) -> FileDiffRecord {
        FileDiffRecord {
            key: FileDiffRecord::key_for(old, new),
            old_path: old.to_string(),
            new_path: new.to_string(),
            diff_text: String::new(),
            is_binary: false,
            additions: 2,
            deletions: 1,
            is_valid: true,
        }
    }

    #[test]
    fn test_status_from_paths() {
        assert_eq!(record("a.rs", "a.rs").status(), FileStatus::Modified);
        assert_eq!(record(DEV_NULL, "a.rs").status(), FileStatus::Added);
        assert_eq!(record("a.rs", DEV_NULL).status(), FileStatus::Deleted);
        assert_eq!(record("a.rs", "b.rs").status(), FileStatus::Renamed);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(record("a.rs", "a.rs").display_name(), "a.rs");
        assert_eq!(record("a.rs", "b.rs").display_name(), "a.rs → b.rs");
        assert_eq!(record("gone.rs", DEV_NULL).display_name(), "gone.rs");
    }

    #[test]
    fn test_synthetic_key_is_not_real() {
        let mut r = record("a.rs", "a.rs");
        assert!(r.has_real_paths());
        r.key = FileDiffRecord::synthetic_key(3);
        assert!(!r.has_real_paths());
    }

    #[test]
    fn test_stats_from_records() {
        let records = vec![record("a.rs", "a.rs"), record("b.rs", "b.rs")];
        let stats = DiffStats::from_records(&records, false);
        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.additions, 4);
        assert_eq!(stats.deletions, 2);
        assert!(stats.has_changes);

        let empty = DiffStats::from_records(&[], false);
        assert_eq!(empty.file_count, 0);
        assert!(!empty.has_changes);
    }
}
