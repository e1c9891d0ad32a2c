//! Collaborators backed by the local git working tree.

use async_trait::async_trait;
use diffdeck_engine::{ContentError, DiffSource, FileContentProvider, SourceError};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::process::Command;

/// Runs `git diff <revision>` in a repository.
#[derive(Debug, Clone)]
pub struct GitDiffSource {
    repo: PathBuf,
}

impl GitDiffSource {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }
}

#[async_trait]
impl DiffSource for GitDiffSource {
    async fn get_diff_text(&self, revision: &str) -> Result<String, SourceError> {
        log::debug!("Running git diff {} in {:?}", revision, self.repo);
        let output = Command::new("git")
            .args(["diff", "--no-color", "--no-ext-diff", revision, "--"])
            .current_dir(&self.repo)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.contains("unknown revision") || stderr.contains("bad revision") {
                return Err(SourceError::UnknownRevision(revision.to_string()));
            }
            return Err(SourceError::CommandFailed(stderr));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        log::info!("git diff {} returned {} bytes", revision, text.len());
        Ok(text)
    }
}

/// Reads current file content from the working tree.
#[derive(Debug, Clone)]
pub struct WorkdirContentProvider {
    root: PathBuf,
}

impl WorkdirContentProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileContentProvider for WorkdirContentProvider {
    async fn get_file_content(&self, path: &str) -> Result<String, ContentError> {
        let bytes = match tokio::fs::read(self.root.join(path)).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ContentError::FileNotFound(path.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        String::from_utf8(bytes).map_err(|_| ContentError::NotText(path.to_string()))
    }
}
