//! Content-addressed "viewed" ledger.
//!
//! A file counts as viewed only while the hash stored with its entry matches
//! the hash of its current diff text, so any change to the diff silently
//! un-views it.

use super::{UndoEntry, UndoStack};
use crate::model::FileDiffRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Stored review state for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewedState {
    pub viewed: bool,
    pub content_hash: String,
}

impl ViewedState {
    /// The reset state used when content no longer matches.
    pub fn cleared() -> Self {
        Self::default()
    }
}

/// Fingerprint of a file's diff text (XxHash64, hex encoded).
pub fn content_hash(text: &str) -> String {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(text.as_bytes());
    format!("{:016x}", hasher.finish())
}

/// Viewed state per file key, plus the undo history of single-file changes.
#[derive(Debug, Clone, Default)]
pub struct ViewedLedger {
    states: HashMap<String, ViewedState>,
    undo: UndoStack,
}

impl ViewedLedger {
    /// Create an empty ledger with the given undo capacity.
    pub fn new(undo_capacity: usize) -> Self {
        Self {
            states: HashMap::new(),
            undo: UndoStack::new(undo_capacity),
        }
    }

    /// Whether `key` is viewed for exactly this diff text.
    pub fn is_viewed(&self, key: &str, diff_text: &str) -> bool {
        self.states
            .get(key)
            .is_some_and(|state| state.viewed && state.content_hash == content_hash(diff_text))
    }

    /// Raw stored state, without checking it against current content.
    pub fn state(&self, key: &str) -> Option<&ViewedState> {
        self.states.get(key)
    }

    /// Record a viewed flag for the current diff text, remembering the prior state for undo.
    pub fn set_viewed(&mut self, key: &str, diff_text: &str, viewed: bool) {
        self.undo.push(UndoEntry {
            file_key: key.to_string(),
            previous_state: self.states.get(key).cloned(),
        });
        self.states.insert(
            key.to_string(),
            ViewedState {
                viewed,
                content_hash: content_hash(diff_text),
            },
        );
    }

    /// Pop the latest undo entry and restore the state it recorded.
    ///
    /// Returns the entry so callers can re-select the file.
    pub fn undo(&mut self) -> Option<UndoEntry> {
        let entry = self.undo.pop()?;
        match &entry.previous_state {
            Some(state) => {
                self.states.insert(entry.file_key.clone(), state.clone());
            }
            None => {
                self.states.remove(&entry.file_key);
            }
        }
        Some(entry)
    }

    /// Set every record's state at once. Bulk changes bypass the undo stack.
    pub fn mark_all(&mut self, records: &[FileDiffRecord], viewed: bool) {
        let mut next = self.states.clone();
        for record in records {
            next.insert(
                record.key.clone(),
                ViewedState {
                    viewed,
                    content_hash: content_hash(&record.diff_text),
                },
            );
        }
        self.states = next;
    }

    /// Reset every entry whose hash no longer matches its record's diff text.
    ///
    /// Entries for keys missing from `records` are kept, since the file may
    /// come back in a later revision. Returns the number of entries reset.
    pub fn invalidate_stale(&mut self, records: &[FileDiffRecord]) -> usize {
        let current: HashMap<&str, String> = records
            .iter()
            .map(|r| (r.key.as_str(), content_hash(&r.diff_text)))
            .collect();

        let mut reset = 0;
        let next = self
            .states
            .iter()
            .map(|(key, state)| {
                let stale = current
                    .get(key.as_str())
                    .is_some_and(|hash| *hash != state.content_hash);
                if stale && *state != ViewedState::cleared() {
                    reset += 1;
                    (key.clone(), ViewedState::cleared())
                } else {
                    (key.clone(), state.clone())
                }
            })
            .collect();
        self.states = next;

        if reset > 0 {
            log::debug!("reset {} viewed entries after content change", reset);
        }
        reset
    }

    /// Number of records currently viewed.
    pub fn viewed_count(&self, records: &[FileDiffRecord]) -> usize {
        records
            .iter()
            .filter(|r| self.is_viewed(&r.key, &r.diff_text))
            .count()
    }

    /// Copy of the stored states, for persistence.
    pub fn snapshot(&self) -> HashMap<String, ViewedState> {
        self.states.clone()
    }

    /// Replace the stored states (e.g. after loading from storage).
    ///
    /// Undo history refers to the replaced states and is dropped.
    pub fn load(&mut self, states: HashMap<String, ViewedState>) {
        self.states = states;
        self.undo.clear();
    }

    /// Number of undoable transitions.
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }
}
