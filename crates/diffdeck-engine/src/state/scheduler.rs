//! Time-sliced work for bulk view-mode changes.
//!
//! Large expand-alls are queued and drained a fixed batch at a time, one
//! batch per [`ReviewState::tick`]. The host returns to its event loop
//! between ticks, so input and paint are never starved.

use super::ReviewState;
use std::collections::VecDeque;
use std::time::Instant;

/// FIFO of file keys waiting to be expanded.
#[derive(Debug, Clone)]
pub struct ExpandScheduler {
    queue: VecDeque<String>,
    batch_size: usize,
}

impl ExpandScheduler {
    pub fn new(batch_size: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            batch_size: batch_size.max(1),
        }
    }

    /// Queue keys for expansion, replacing anything still pending.
    pub fn schedule(&mut self, keys: impl IntoIterator<Item = String>) {
        self.queue = keys.into_iter().collect();
    }

    /// Append keys behind anything still pending.
    pub fn enqueue(&mut self, keys: impl IntoIterator<Item = String>) {
        self.queue.extend(keys);
    }

    /// Take the next batch (at most `batch_size` keys).
    pub fn next_batch(&mut self) -> Vec<String> {
        let take = self.batch_size.min(self.queue.len());
        self.queue.drain(..take).collect()
    }

    /// Drop pending work (e.g. when collapse-all wins the race).
    pub fn cancel(&mut self) {
        self.queue.clear();
    }

    /// Forget a key that no longer exists.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.queue.retain(|key| keep(key));
    }

    pub fn is_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }
}

/// Run queued work to completion, yielding to the runtime between ticks.
///
/// Meant for hosts without a frame loop of their own; interactive hosts call
/// [`ReviewState::tick`] once per frame instead.
pub async fn drive_pending_work(state: &mut ReviewState) {
    while state.has_pending_work() {
        state.tick(Instant::now());
        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_of_fixed_size() {
        let mut scheduler = ExpandScheduler::new(5);
        scheduler.schedule((0..12).map(|i| i.to_string()));

        assert_eq!(scheduler.next_batch().len(), 5);
        assert_eq!(scheduler.next_batch().len(), 5);
        assert_eq!(scheduler.next_batch(), vec!["10", "11"]);
        assert!(!scheduler.is_pending());
        assert!(scheduler.next_batch().is_empty());
    }

    #[test]
    fn test_cancel_and_retain() {
        let mut scheduler = ExpandScheduler::new(5);
        scheduler.schedule(["a", "b", "c"].map(String::from));
        scheduler.retain(|key| key != "b");
        assert_eq!(scheduler.pending_len(), 2);
        scheduler.enqueue(["d".to_string()]);
        assert_eq!(scheduler.next_batch(), vec!["a", "c", "d"]);
        scheduler.enqueue(["e".to_string()]);

        scheduler.cancel();
        assert!(!scheduler.is_pending());
    }
}
