//! Offset table for the virtualized file list.
//!
//! Heights come from the caller (measured if known, estimated otherwise);
//! the list only keeps prefix sums and answers window queries.

use std::ops::Range;

/// The slice of the list that should be laid out for the current viewport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderWindow {
    /// Item indices to render, overscan included.
    pub range: Range<usize>,
    /// Top offset of each item in `range`, followed by the bottom of the last one.
    pub offsets: Vec<u32>,
    /// First item intersecting the viewport (overscan excluded).
    pub first_visible: Option<usize>,
    /// Height of the whole list.
    pub total_height: u32,
}

/// Prefix-sum offset table over item heights.
#[derive(Debug, Clone, Default)]
pub struct VirtualList {
    /// `offsets[i]` is the top of item `i`; the last entry is the total height.
    offsets: Vec<u32>,
}

impl VirtualList {
    /// Build the table from per-item heights. Zero heights count as one unit.
    pub fn from_heights(heights: impl IntoIterator<Item = u32>) -> Self {
        let mut offsets = vec![0u32];
        let mut top = 0u32;
        for height in heights {
            top = top.saturating_add(height.max(1));
            offsets.push(top);
        }
        Self { offsets }
    }

    pub fn len(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_height(&self) -> u32 {
        self.offsets.last().copied().unwrap_or(0)
    }

    /// Top offset of an item (the total height for an index past the end).
    pub fn offset_of(&self, index: usize) -> u32 {
        let index = index.min(self.len());
        self.offsets[index]
    }

    pub fn height_of(&self, index: usize) -> u32 {
        if index >= self.len() {
            return 0;
        }
        self.offsets[index + 1] - self.offsets[index]
    }

    /// Index of the item covering `offset`, clamped to the last item.
    pub fn index_at(&self, offset: u32) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let ends = &self.offsets[1..];
        let index = ends.partition_point(|&end| end <= offset);
        Some(index.min(self.len() - 1))
    }

    /// Largest scroll offset that still fills the viewport.
    pub fn max_scroll(&self, viewport_height: u32) -> u32 {
        self.total_height().saturating_sub(viewport_height)
    }

    /// Items to lay out for a viewport starting at `scroll_top`.
    pub fn window(&self, scroll_top: u32, viewport_height: u32, overscan: usize) -> RenderWindow {
        let total_height = self.total_height();
        let (Some(first), Some(last)) = (
            self.index_at(scroll_top),
            self.index_at(
                scroll_top
                    .saturating_add(viewport_height.max(1))
                    .saturating_sub(1),
            ),
        ) else {
            return RenderWindow {
                total_height,
                ..RenderWindow::default()
            };
        };

        let start = first.saturating_sub(overscan);
        let end = (last + 1 + overscan).min(self.len());
        RenderWindow {
            offsets: self.offsets[start..=end].to_vec(),
            range: start..end,
            first_visible: Some(first),
            total_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_offsets_and_lookup() {
        let list = VirtualList::from_heights([100, 200, 50]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.total_height(), 350);
        assert_eq!(list.offset_of(2), 300);
        assert_eq!(list.height_of(1), 200);
        assert_eq!(list.index_at(0), Some(0));
        assert_eq!(list.index_at(99), Some(0));
        assert_eq!(list.index_at(100), Some(1));
        assert_eq!(list.index_at(10_000), Some(2));
    }

    #[test]
    fn test_window_with_overscan() {
        let list = VirtualList::from_heights(vec![100; 50]);
        let window = list.window(1_050, 300, 2);
        assert_eq!(window.first_visible, Some(10));
        assert_eq!(window.range, 8..16);
        assert_eq!(window.offsets[0], 800);
        assert_eq!(window.offsets.len(), 9);
        assert_eq!(window.offsets[8], 1_600);
    }

    #[test]
    fn test_window_clamps_at_edges() {
        let list = VirtualList::from_heights(vec![100; 5]);
        assert_eq!(list.window(0, 150, 3).range, 0..5);
        assert_eq!(list.max_scroll(150), 350);
    }

    #[test]
    fn test_empty_list() {
        let list = VirtualList::from_heights(Vec::new());
        let window = list.window(0, 500, 2);
        assert!(window.range.is_empty());
        assert_eq!(window.first_visible, None);
        assert_eq!(list.index_at(0), None);
    }
}
