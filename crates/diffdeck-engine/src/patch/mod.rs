//! Patch reversal: recover pre-change content from a per-file patch.

mod reconstruct;

pub use reconstruct::{apply_hunks, reconstruct_old_content, ReconstructError};
