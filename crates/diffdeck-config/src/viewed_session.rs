//! Viewed-state persistence
//!
//! One TOML file per review session, normally under
//! [`viewed_dir`](crate::paths::viewed_dir).
//! Each file records, per file key, whether the file was viewed and the
//! fingerprint of the diff text it was viewed at.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::hash::Hasher;
use std::path::{Path, PathBuf};
use twox_hash::XxHash64;

const SESSION_VERSION: u32 = 1;

/// Session metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionMeta {
    pub last_modified: DateTime<Utc>,
    pub version: u32,
}

/// Stored state of one file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ViewedEntry {
    pub viewed: bool,
    #[serde(default)]
    pub content_hash: String,
}

/// Complete viewed session with metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewedSession {
    pub meta: SessionMeta,
    #[serde(default)]
    pub files: BTreeMap<String, ViewedEntry>,
}

impl Default for ViewedSession {
    fn default() -> Self {
        Self {
            meta: SessionMeta {
                last_modified: Utc::now(),
                version: SESSION_VERSION,
            },
            files: BTreeMap::new(),
        }
    }
}

/// Make a session id safe to use as a file name.
///
/// Anything outside `[A-Za-z0-9._-]` becomes `_`, followed by a short hash of
/// the id so that e.g. `org/repo` and `org_repo` get different files. An empty
/// id becomes `default`.
pub fn sanitize_session_id(id: &str) -> String {
    let id = id.trim();
    let cleaned: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        return "default".to_string();
    }
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(id.as_bytes());
    format!("{}-{:08x}", cleaned, hasher.finish() as u32)
}

impl ViewedSession {
    /// Path of the session file for `session_id` inside `dir`
    pub fn path_in(dir: &Path, session_id: &str) -> PathBuf {
        dir.join(format!("{}.toml", sanitize_session_id(session_id)))
    }

    /// Load a session from `dir`, or an empty one if it does not exist yet
    pub fn load_in(dir: &Path, session_id: &str) -> Result<Self> {
        let path = Self::path_in(dir, session_id);
        if !path.exists() {
            log::info!("No viewed session {:?}, starting fresh", session_id);
            return Ok(Self::default());
        }
        let session = Self::load_from_path(&path)?;
        log::info!(
            "Loaded viewed session from {:?} ({} files)",
            path,
            session.files.len()
        );
        Ok(session)
    }

    /// Save the session into `dir` under `session_id`
    pub fn save_in(&mut self, dir: &Path, session_id: &str) -> Result<()> {
        self.save_to_path(&Self::path_in(dir, session_id))
    }

    /// Load session from specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read viewed session: {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse viewed session: {:?}", path))
    }

    /// Save session to specific path, updating its timestamp
    pub fn save_to_path(&mut self, path: &Path) -> Result<()> {
        self.meta.last_modified = Utc::now();
        let content = toml::to_string_pretty(self).context("Failed to serialize viewed session")?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write viewed session: {:?}", path))?;

        log::debug!("Saved viewed session to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ViewedSession {
        let mut session = ViewedSession::default();
        session.files.insert(
            "src/main.rs->src/main.rs".to_string(),
            ViewedEntry {
                viewed: true,
                content_hash: "0123456789abcdef".to_string(),
            },
        );
        session.files.insert(
            "/dev/null->new.rs".to_string(),
            ViewedEntry::default(),
        );
        session
    }

    #[test]
    fn test_sanitize_session_id() {
        let name = sanitize_session_id("org/repo@HEAD~1");
        let (cleaned, hash) = name.rsplit_once('-').unwrap();
        assert_eq!(cleaned, "org_repo_HEAD_1");
        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

        assert!(sanitize_session_id("repo-main").starts_with("repo-main-"));
        assert_eq!(sanitize_session_id("  "), "default");
        assert_eq!(sanitize_session_id(" org/repo "), sanitize_session_id("org/repo"));
    }

    #[test]
    fn test_similar_session_ids_use_separate_files() {
        assert_ne!(sanitize_session_id("org/repo"), sanitize_session_id("org_repo"));

        let dir = tempfile::tempdir().unwrap();
        let mut first = sample();
        first.save_in(dir.path(), "org/repo").unwrap();
        ViewedSession::default().save_in(dir.path(), "org_repo").unwrap();

        let loaded = ViewedSession::load_in(dir.path(), "org/repo").unwrap();
        assert_eq!(loaded.files, first.files);
        assert!(ViewedSession::load_in(dir.path(), "org_repo")
            .unwrap()
            .files
            .is_empty());
    }

    #[test]
    fn test_session_serialization() {
        let session = sample();
        let toml_str = toml::to_string_pretty(&session).unwrap();
        assert!(toml_str.contains("[meta]"));
        assert!(toml_str.contains("src/main.rs->src/main.rs"));

        let parsed: ViewedSession = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.files, session.files);
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewed").join("s.toml");

        let mut session = sample();
        session.save_to_path(&path).unwrap();
        let loaded = ViewedSession::load_from_path(&path).unwrap();
        assert_eq!(loaded.files, session.files);
        assert_eq!(loaded.meta.version, SESSION_VERSION);
    }

    #[test]
    fn test_missing_session_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let session = ViewedSession::load_in(dir.path(), "nothing-here").unwrap();
        assert!(session.files.is_empty());

        let mut session = sample();
        session.save_in(dir.path(), "org/repo").unwrap();
        assert!(ViewedSession::path_in(dir.path(), "org/repo").exists());
        let loaded = ViewedSession::load_in(dir.path(), "org/repo").unwrap();
        assert_eq!(loaded.files, session.files);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "not = [valid").unwrap();
        assert!(ViewedSession::load_from_path(&path).is_err());
    }
}
