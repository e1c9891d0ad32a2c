//! Trait for obtaining the diff under review.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when producing diff text.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The revision could not be resolved.
    #[error("Unknown revision: {0}")]
    UnknownRevision(String),

    /// The underlying tool failed.
    #[error("Diff command failed: {0}")]
    CommandFailed(String),

    /// Reading the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Produces raw unified-diff text for a revision.
///
/// The result may be empty (no changes) and may take a while to arrive.
#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Get the diff of the working tree against `revision`.
    async fn get_diff_text(&self, revision: &str) -> Result<String, SourceError>;
}
