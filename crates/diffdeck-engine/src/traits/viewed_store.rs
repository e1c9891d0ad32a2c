//! Trait for persisting the viewed ledger between runs.

use crate::ledger::ViewedState;
use std::collections::HashMap;
use thiserror::Error;

/// Errors from a viewed-state store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read viewed state: {0}")]
    Read(String),

    #[error("Failed to write viewed state: {0}")]
    Write(String),
}

/// Durable storage for viewed state, keyed by review session.
pub trait ViewedStore {
    /// Load the stored states for `session_id`. A missing session is empty.
    fn load(&self, session_id: &str) -> Result<HashMap<String, ViewedState>, StoreError>;

    /// Replace the stored states for `session_id`.
    fn persist(
        &self,
        session_id: &str,
        states: &HashMap<String, ViewedState>,
    ) -> Result<(), StoreError>;
}

/// In-memory store, mostly useful in tests.
#[derive(Debug, Default)]
pub struct MemoryViewedStore {
    sessions: std::sync::Mutex<HashMap<String, HashMap<String, ViewedState>>>,
}

impl ViewedStore for MemoryViewedStore {
    fn load(&self, session_id: &str) -> Result<HashMap<String, ViewedState>, StoreError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|e| StoreError::Read(e.to_string()))?;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    fn persist(
        &self,
        session_id: &str,
        states: &HashMap<String, ViewedState>,
    ) -> Result<(), StoreError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| StoreError::Write(e.to_string()))?;
        sessions.insert(session_id.to_string(), states.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryViewedStore::default();
        assert!(store.load("s").unwrap().is_empty());

        let mut states = HashMap::new();
        states.insert(
            "a->a".to_string(),
            ViewedState {
                viewed: true,
                content_hash: "00ff".to_string(),
            },
        );
        store.persist("s", &states).unwrap();
        assert_eq!(store.load("s").unwrap(), states);
        assert!(store.load("other").unwrap().is_empty());
    }
}
