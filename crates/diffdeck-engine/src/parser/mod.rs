//! Unified diff parsing.

mod hunk_header;
mod hunks;
mod splitter;

pub use hunk_header::{parse_hunk_header, HunkRange};
pub use hunks::{parse_hunks, HunkParseError};
pub use splitter::split;
