//! Structured hunks used by patch reversal and rendering.

/// A contiguous region of changes (hunk).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// Header line (e.g., "@@ -10,5 +10,7 @@ fn example()").
    pub header: String,
    /// Old file starting line.
    pub old_start: u32,
    /// Number of lines in old version.
    pub old_count: u32,
    /// New file starting line.
    pub new_start: u32,
    /// Number of lines in new version.
    pub new_count: u32,
    /// Lines in this hunk.
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    /// Create a new hunk with the given header info.
    pub fn new(old_start: u32, old_count: u32, new_start: u32, new_count: u32) -> Self {
        Self {
            header: format!(
                "@@ -{},{} +{},{} @@",
                old_start, old_count, new_start, new_count
            ),
            old_start,
            old_count,
            new_start,
            new_count,
            lines: Vec::new(),
        }
    }

    /// The same hunk with its polarity flipped.
    ///
    /// Ranges swap sides and additions become deletions (and vice versa), so
    /// applying the result to the new file yields the old one.
    pub fn reversed(&self) -> Self {
        let mut hunk = Hunk::new(self.new_start, self.new_count, self.old_start, self.old_count);
        hunk.lines = self.lines.iter().map(DiffLine::reversed).collect();
        hunk
    }
}

/// A single line in the diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    /// Line type.
    pub kind: LineKind,
    /// Line content (without leading +/-/ ).
    pub content: String,
    /// Line number in old file (for Context and Deletion).
    pub old_line: Option<u32>,
    /// Line number in new file (for Context and Addition).
    pub new_line: Option<u32>,
    /// Followed by "\ No newline at end of file".
    pub missing_newline: bool,
}

impl DiffLine {
    /// Create a new context line.
    pub fn context(content: impl Into<String>, old_line: u32, new_line: u32) -> Self {
        Self {
            kind: LineKind::Context,
            content: content.into(),
            old_line: Some(old_line),
            new_line: Some(new_line),
            missing_newline: false,
        }
    }

    /// Create a new addition line.
    pub fn addition(content: impl Into<String>, new_line: u32) -> Self {
        Self {
            kind: LineKind::Addition,
            content: content.into(),
            old_line: None,
            new_line: Some(new_line),
            missing_newline: false,
        }
    }

    /// Create a new deletion line.
    pub fn deletion(content: impl Into<String>, old_line: u32) -> Self {
        Self {
            kind: LineKind::Deletion,
            content: content.into(),
            old_line: Some(old_line),
            new_line: None,
            missing_newline: false,
        }
    }

    /// Create a hunk header line.
    pub fn hunk_header(header: impl Into<String>) -> Self {
        Self {
            kind: LineKind::HunkHeader,
            content: header.into(),
            old_line: None,
            new_line: None,
            missing_newline: false,
        }
    }

    fn reversed(&self) -> Self {
        let kind = match self.kind {
            LineKind::Addition => LineKind::Deletion,
            LineKind::Deletion => LineKind::Addition,
            other => other,
        };
        Self {
            kind,
            content: self.content.clone(),
            old_line: self.new_line,
            new_line: self.old_line,
            missing_newline: self.missing_newline,
        }
    }
}

/// Line type in the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Unchanged line (for context).
    Context,
    /// Added line (+).
    Addition,
    /// Removed line (-).
    Deletion,
    /// @@ header line.
    HunkHeader,
}

impl LineKind {
    /// Get the prefix character for this line type.
    pub fn prefix(&self) -> char {
        match self {
            LineKind::Context => ' ',
            LineKind::Addition => '+',
            LineKind::Deletion => '-',
            LineKind::HunkHeader => '@',
        }
    }
}
