//! Viewport and selection state.
//!
//! There is no separate cursor: the "current" file is whichever one sits at
//! the top of the viewport, and selecting a file means scrolling to it.

use crate::model::FileDiffRecord;
use std::time::Instant;

/// A transient highlight applied by focus-scroll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub key: String,
    pub expires_at: Instant,
}

/// Navigation state within the review list.
#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    /// Key of the most recently selected file.
    pub selected: Option<String>,
    /// Scroll offset, in layout units.
    pub scroll_top: u32,
    /// Viewport height, in layout units.
    pub viewport_height: u32,
    /// Active focus highlight.
    pub highlight: Option<Highlight>,
}

impl NavigationState {
    /// Create new navigation state.
    pub fn new(viewport_height: u32) -> Self {
        Self {
            viewport_height,
            ..Self::default()
        }
    }

    /// Scroll by a signed delta, clamped to `[0, max_scroll]`.
    pub fn scroll_by(&mut self, delta: i64, max_scroll: u32) {
        let target = i64::from(self.scroll_top).saturating_add(delta);
        self.scroll_top = target.clamp(0, i64::from(max_scroll)) as u32;
    }

    /// Scroll to an absolute offset, clamped to `max_scroll`.
    pub fn scroll_to(&mut self, offset: u32, max_scroll: u32) {
        self.scroll_top = offset.min(max_scroll);
    }

    /// Clear the highlight once it has expired. Returns true if cleared.
    pub fn clear_expired_highlight(&mut self, now: Instant) -> bool {
        if self
            .highlight
            .as_ref()
            .is_some_and(|highlight| now >= highlight.expires_at)
        {
            self.highlight = None;
            return true;
        }
        false
    }

    /// Whether `key` is currently highlighted.
    pub fn is_highlighted(&self, key: &str) -> bool {
        self.highlight.as_ref().is_some_and(|h| h.key == key)
    }
}

/// Index of the next record after `current` that is not viewed, wrapping
/// around to the start. `None` if every other record is viewed.
pub fn next_unviewed(
    records: &[FileDiffRecord],
    current: usize,
    is_viewed: impl Fn(&FileDiffRecord) -> bool,
) -> Option<usize> {
    let after = (current + 1)..records.len();
    let before = 0..current.min(records.len());
    after.chain(before).find(|&idx| !is_viewed(&records[idx]))
}
