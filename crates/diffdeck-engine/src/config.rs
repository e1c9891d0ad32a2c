//! Engine tunables.
//!
//! Hosts build this from their own configuration layer; every field has a
//! default matching the behavior described in the crate docs.

use crate::ledger::DEFAULT_UNDO_CAPACITY;
use std::time::Duration;

/// Files with more changed lines than this are never rendered inline.
pub const DEFAULT_LARGE_DIFF_THRESHOLD: usize = 2000;
/// Files expanded per scheduler tick during a batched expand-all.
pub const DEFAULT_EXPAND_BATCH_SIZE: usize = 5;
/// Expand-all over at most this many files happens in one step.
pub const DEFAULT_ATOMIC_EXPAND_LIMIT: usize = 10;
/// Maximum concurrent file-content fetches.
pub const DEFAULT_PREFETCH_CONCURRENCY: usize = 20;
/// How long a focus-scroll highlight stays visible.
pub const DEFAULT_HIGHLIGHT_DURATION: Duration = Duration::from_millis(2000);

/// Height model used to seed the virtual list before real sizes are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeightModel {
    pub per_line_height: u32,
    pub header_height: u32,
    pub collapsed_height: u32,
    pub min_height: u32,
    pub max_height: u32,
    /// Extra items rendered on each side of the visible range.
    pub overscan: usize,
}

impl Default for HeightModel {
    fn default() -> Self {
        Self {
            per_line_height: 20,
            header_height: 48,
            collapsed_height: 48,
            min_height: 150,
            max_height: 800,
            overscan: 2,
        }
    }
}

impl HeightModel {
    /// Estimated height of an expanded file with `line_count` changed lines.
    pub fn expanded_estimate(&self, line_count: usize) -> u32 {
        let lines = u32::try_from(line_count).unwrap_or(u32::MAX);
        lines
            .saturating_mul(self.per_line_height)
            .saturating_add(self.header_height)
            .clamp(self.min_height, self.max_height.max(self.min_height))
    }
}

/// Configuration for a [`ReviewState`](crate::state::ReviewState).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub large_diff_threshold: usize,
    pub expand_batch_size: usize,
    pub atomic_expand_limit: usize,
    pub undo_capacity: usize,
    pub highlight_duration: Duration,
    pub prefetch_concurrency: usize,
    pub layout: HeightModel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            large_diff_threshold: DEFAULT_LARGE_DIFF_THRESHOLD,
            expand_batch_size: DEFAULT_EXPAND_BATCH_SIZE,
            atomic_expand_limit: DEFAULT_ATOMIC_EXPAND_LIMIT,
            undo_capacity: DEFAULT_UNDO_CAPACITY,
            highlight_duration: DEFAULT_HIGHLIGHT_DURATION,
            prefetch_concurrency: DEFAULT_PREFETCH_CONCURRENCY,
            layout: HeightModel::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_is_clamped() {
        let model = HeightModel::default();
        assert_eq!(model.expanded_estimate(0), 150);
        assert_eq!(model.expanded_estimate(10), 248);
        assert_eq!(model.expanded_estimate(5000), 800);
        assert_eq!(model.expanded_estimate(usize::MAX), 800);
    }
}
