//! Data models for diff review.

mod hunk;
mod record;

pub use hunk::{DiffLine, Hunk, LineKind};
pub use record::{DiffStats, FileDiffRecord, FileStatus, DEV_NULL, SYNTHETIC_KEY_PREFIX};
