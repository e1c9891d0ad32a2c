//! Trait for fetching current file content.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when fetching file content.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The requested file was not found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// The file is not valid UTF-8 text.
    #[error("File is not text: {0}")]
    NotText(String),

    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The provider is not available.
    #[error("Content provider unavailable: {0}")]
    Unavailable(String),
}

/// Provides the current (post-change) content of files.
///
/// Used to build full-file views. Failures only disable the full-file view
/// of the affected file.
#[async_trait]
pub trait FileContentProvider: Send + Sync {
    /// Fetch the full text of `path`, relative to the repository root.
    async fn get_file_content(&self, path: &str) -> Result<String, ContentError>;
}

/// A provider that never has content, for hosts without a working tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContentProvider;

#[async_trait]
impl FileContentProvider for NoContentProvider {
    async fn get_file_content(&self, path: &str) -> Result<String, ContentError> {
        Err(ContentError::Unavailable(format!(
            "no content available for {}",
            path
        )))
    }
}
