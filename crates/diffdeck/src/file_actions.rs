//! Delegated per-file actions run as external commands.

use diffdeck_engine::{FileActionError, FileActions};
use std::path::PathBuf;
use std::process::{Command, Output};

/// Runs git, the platform opener and the configured editor.
///
/// `discard_file` waits for git and should not run on the UI thread.
#[derive(Debug, Clone)]
pub struct ShellFileActions {
    repo: PathBuf,
    /// Revision the diff is taken against; discards restore files to it.
    revision: String,
    ide_command: String,
    reveal_command: String,
}

impl ShellFileActions {
    pub fn new(
        repo: impl Into<PathBuf>,
        revision: &str,
        ide_command: &str,
        reveal_command: &str,
    ) -> Self {
        Self {
            repo: repo.into(),
            revision: revision.to_string(),
            ide_command: ide_command.to_string(),
            reveal_command: reveal_command.to_string(),
        }
    }

    fn git(&self, args: &[&str]) -> Result<Output, FileActionError> {
        Ok(Command::new("git")
            .args(args)
            .current_dir(&self.repo)
            .output()?)
    }

    fn git_checked(&self, args: &[&str]) -> Result<(), FileActionError> {
        let output = self.git(args)?;
        if !output.status.success() {
            return Err(FileActionError::CommandFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(())
    }

    /// Start `command_line` with `path` appended, without waiting for it.
    fn launch(
        &self,
        what: &'static str,
        command_line: &str,
        path: &str,
    ) -> Result<(), FileActionError> {
        let (program, args) = split_command(command_line).ok_or(FileActionError::NotConfigured(what))?;
        let child = Command::new(program)
            .args(args)
            .arg(self.repo.join(path))
            .current_dir(&self.repo)
            .spawn()?;
        log::info!("Launched {} for {} (pid {})", what, path, child.id());
        Ok(())
    }
}

/// Split a configured command into program and leading arguments.
fn split_command(command_line: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = command_line.split_whitespace();
    let program = parts.next()?;
    Some((program, parts.collect()))
}

impl FileActions for ShellFileActions {
    fn discard_file(&self, path: &str) -> Result<(), FileActionError> {
        let object = format!("{}:{}", self.revision, path);
        let in_revision = self.git(&["cat-file", "-e", &object])?.status.success();

        if in_revision {
            self.git_checked(&["checkout", &self.revision, "--", path])?;
        } else {
            // Added in the working tree: drop it from the index and the disk
            self.git_checked(&["rm", "--force", "--quiet", "--ignore-unmatch", "--", path])?;
            let file = self.repo.join(path);
            if file.exists() {
                std::fs::remove_file(file)?;
            }
        }
        log::info!("Discarded changes to {} (restored from {})", path, self.revision);
        Ok(())
    }

    fn reveal_in_file_system(&self, path: &str) -> Result<(), FileActionError> {
        self.launch("reveal", &self.reveal_command, path)
    }

    fn open_in_editor(&self, path: &str) -> Result<(), FileActionError> {
        self.launch("editor", &self.ide_command, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        assert_eq!(split_command("open -R"), Some(("open", vec!["-R"])));
        assert_eq!(split_command("code"), Some(("code", vec![])));
        assert_eq!(split_command("   "), None);
    }

    #[test]
    fn test_unconfigured_editor() {
        let actions = ShellFileActions::new(".", "HEAD", "", "xdg-open");
        assert!(matches!(
            actions.open_in_editor("a.rs"),
            Err(FileActionError::NotConfigured("editor"))
        ));
    }

    fn run_git(dir: &std::path::Path, args: &[&str]) {
        let status = Command::new("git")
            .args(["-c", "user.name=test", "-c", "user.email=test@example.com"])
            .args(["-c", "commit.gpgsign=false"])
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap()
            .status;
        assert!(status.success(), "git {:?} failed", args);
    }

    #[test]
    fn test_discard_restores_revision() {
        if Command::new("git").arg("--version").output().is_err() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        run_git(root, &["init", "--quiet"]);
        std::fs::write(root.join("edit.rs"), "one\n").unwrap();
        std::fs::write(root.join("keep.rs"), "keep\n").unwrap();
        run_git(root, &["add", "."]);
        run_git(root, &["commit", "--quiet", "-m", "init"]);

        std::fs::write(root.join("edit.rs"), "two\n").unwrap();
        std::fs::write(root.join("added.rs"), "new\n").unwrap();
        run_git(root, &["add", "added.rs"]);
        run_git(root, &["mv", "keep.rs", "moved.rs"]);

        let actions = ShellFileActions::new(root, "HEAD", "", "");
        actions.discard_file("edit.rs").unwrap();
        assert_eq!(std::fs::read_to_string(root.join("edit.rs")).unwrap(), "one\n");

        actions.discard_file("added.rs").unwrap();
        assert!(!root.join("added.rs").exists());

        actions.discard_file("keep.rs").unwrap();
        actions.discard_file("moved.rs").unwrap();
        assert_eq!(std::fs::read_to_string(root.join("keep.rs")).unwrap(), "keep\n");
        assert!(!root.join("moved.rs").exists());
    }

    #[test]
    fn test_discard_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let actions = ShellFileActions::new(dir.path(), "HEAD", "", "");
        assert!(actions.discard_file("a.rs").is_err());
    }
}
