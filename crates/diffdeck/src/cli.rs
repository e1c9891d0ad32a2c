use clap::Parser;
use std::path::{Path, PathBuf};

/// Review the changes of a git working tree file by file.
#[derive(Debug, Parser)]
#[command(name = "diffdeck", version, about)]
pub struct Cli {
    /// Revision to diff the working tree against
    #[arg(default_value = "HEAD")]
    pub revision: String,

    /// Review session id used to persist viewed state
    /// [default: <repo dir name>-<revision>]
    #[arg(long, short)]
    pub session: Option<String>,

    /// Only show files whose path ends with this suffix
    #[arg(long, short)]
    pub filter: Option<String>,

    /// Repository directory
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,
}

impl Cli {
    /// The explicit session id, or one derived from the repository and revision.
    pub fn session_id(&self) -> String {
        if let Some(session) = &self.session {
            return session.clone();
        }
        format!("{}-{}", repo_name(&self.repo), self.revision)
    }
}

fn repo_name(repo: &Path) -> String {
    let absolute = std::fs::canonicalize(repo).unwrap_or_else(|_| repo.to_path_buf());
    absolute
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "repo".to_string())
}
