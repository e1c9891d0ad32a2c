//! Bounded undo stack for "mark viewed" transitions.

use super::ViewedState;
use std::collections::VecDeque;

/// Number of undo entries kept before the oldest are dropped.
pub const DEFAULT_UNDO_CAPACITY: usize = 50;

/// A recorded viewed-state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoEntry {
    /// Key of the file whose state changed.
    pub file_key: String,
    /// State before the change (`None` if the file had no entry).
    pub previous_state: Option<ViewedState>,
}

/// LIFO stack that forgets its oldest entries past a fixed capacity.
#[derive(Debug, Clone)]
pub struct UndoStack {
    entries: VecDeque<UndoEntry>,
    capacity: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_CAPACITY)
    }
}

impl UndoStack {
    /// Create an empty stack holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(64)),
            capacity: capacity.max(1),
        }
    }

    /// Push an entry, dropping the oldest one if full.
    pub fn push(&mut self, entry: UndoEntry) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Pop the most recent entry.
    pub fn pop(&mut self) -> Option<UndoEntry> {
        self.entries.pop_back()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str) -> UndoEntry {
        UndoEntry {
            file_key: key.to_string(),
            previous_state: None,
        }
    }

    #[test]
    fn test_lifo_order() {
        let mut stack = UndoStack::default();
        stack.push(entry("a"));
        stack.push(entry("b"));
        assert_eq!(stack.pop().unwrap().file_key, "b");
        assert_eq!(stack.pop().unwrap().file_key, "a");
        assert!(stack.pop().is_none());
    }

    #[test]
    fn test_oldest_dropped_past_capacity() {
        let mut stack = UndoStack::new(3);
        for key in ["a", "b", "c", "d"] {
            stack.push(entry(key));
        }
        assert_eq!(stack.len(), 3);
        let keys: Vec<String> = std::iter::from_fn(|| stack.pop())
            .map(|e| e.file_key)
            .collect();
        assert_eq!(keys, vec!["d", "c", "b"]);
    }
}
