//! Trait for file operations the engine delegates to the host.

use thiserror::Error;

/// Errors from delegated file operations.
#[derive(Debug, Error)]
pub enum FileActionError {
    /// No command is configured for the operation.
    #[error("No command configured for {0}")]
    NotConfigured(&'static str),

    /// The command ran and reported failure.
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Side-effecting operations on working-tree files.
///
/// The engine only emits the matching [`ReviewEvent`](crate::ReviewEvent);
/// the host routes it here. Implementations may block, so hosts should call
/// them off the UI thread.
pub trait FileActions: Send + Sync {
    /// Return `path` to its state in the reviewed revision.
    ///
    /// A path that does not exist in that revision is removed. Renames are
    /// discarded by calling this for both the old and the new path.
    fn discard_file(&self, path: &str) -> Result<(), FileActionError>;

    /// Show `path` in the platform file manager.
    fn reveal_in_file_system(&self, path: &str) -> Result<(), FileActionError>;

    /// Open `path` in the configured editor.
    fn open_in_editor(&self, path: &str) -> Result<(), FileActionError>;
}
