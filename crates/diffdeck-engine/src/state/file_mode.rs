/// How a single file is presented in the review list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FileViewMode {
    /// Header only.
    #[default]
    Collapsed,
    /// Hunks of the diff.
    Expanded,
    /// The whole new file with changes marked inline.
    ExpandedFull,
}

impl FileViewMode {
    pub fn is_collapsed(self) -> bool {
        self == FileViewMode::Collapsed
    }

    pub fn is_expanded(self) -> bool {
        !self.is_collapsed()
    }

    /// Expand/collapse toggle. Leaving full view always collapses.
    pub fn toggled(self) -> Self {
        match self {
            FileViewMode::Collapsed => FileViewMode::Expanded,
            FileViewMode::Expanded | FileViewMode::ExpandedFull => FileViewMode::Collapsed,
        }
    }

    /// Indicator shown in the file header.
    pub fn indicator(self) -> &'static str {
        match self {
            FileViewMode::Collapsed => "▶",
            FileViewMode::Expanded => "▼",
            FileViewMode::ExpandedFull => "▽",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_cycle() {
        assert_eq!(FileViewMode::Collapsed.toggled(), FileViewMode::Expanded);
        assert_eq!(FileViewMode::Expanded.toggled(), FileViewMode::Collapsed);
        assert_eq!(FileViewMode::ExpandedFull.toggled(), FileViewMode::Collapsed);
        assert!(FileViewMode::ExpandedFull.is_expanded());
    }
}
