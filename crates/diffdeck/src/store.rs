//! Viewed-state persistence on top of diffdeck-config sessions.

use diffdeck_config::{ViewedEntry, ViewedSession};
use diffdeck_engine::{StoreError, ViewedState, ViewedStore};
use std::collections::HashMap;
use std::path::PathBuf;

/// Stores each review session as a TOML file in one directory.
#[derive(Debug, Clone)]
pub struct SessionViewedStore {
    dir: PathBuf,
}

impl SessionViewedStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ViewedStore for SessionViewedStore {
    fn load(&self, session_id: &str) -> Result<HashMap<String, ViewedState>, StoreError> {
        let session = ViewedSession::load_in(&self.dir, session_id)
            .map_err(|e| StoreError::Read(format!("{:#}", e)))?;
        Ok(session
            .files
            .into_iter()
            .map(|(key, entry)| {
                let state = ViewedState {
                    viewed: entry.viewed,
                    content_hash: entry.content_hash,
                };
                (key, state)
            })
            .collect())
    }

    fn persist(
        &self,
        session_id: &str,
        states: &HashMap<String, ViewedState>,
    ) -> Result<(), StoreError> {
        let files = states
            .iter()
            .map(|(key, state)| {
                let entry = ViewedEntry {
                    viewed: state.viewed,
                    content_hash: state.content_hash.clone(),
                };
                (key.clone(), entry)
            })
            .collect();
        let mut session = ViewedSession {
            files,
            ..ViewedSession::default()
        };
        session
            .save_in(&self.dir, session_id)
            .map_err(|e| StoreError::Write(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_persist_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionViewedStore::new(dir.path());
        assert!(store.load("repo-HEAD").unwrap().is_empty());

        let mut states = HashMap::new();
        states.insert(
            "a.rs->a.rs".to_string(),
            ViewedState {
                viewed: true,
                content_hash: "abcdef0123456789".to_string(),
            },
        );
        states.insert("b.rs->b.rs".to_string(), ViewedState::cleared());
        store.persist("repo-HEAD", &states).unwrap();

        assert_eq!(store.load("repo-HEAD").unwrap(), states);
        assert!(store.load("repo-main").unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_session_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(ViewedSession::path_in(dir.path(), "s"), "files = 3").unwrap();
        let store = SessionViewedStore::new(dir.path());
        assert!(matches!(store.load("s"), Err(StoreError::Read(_))));
    }
}
