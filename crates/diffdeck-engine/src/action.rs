//! Review actions
//!
//! Semantic actions the review state understands. The host maps its own input
//! events (keys, mouse, commands) to these and dispatches them through
//! [`ReviewState::handle_action`](crate::state::ReviewState::handle_action).

/// Actions that can be performed on the review list.
///
/// Actions without an explicit file key act on the first file visible in
/// the viewport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    // === Scrolling ===
    /// Scroll down by a number of layout units
    ScrollDown(u32),
    /// Scroll up by a number of layout units
    ScrollUp(u32),
    /// Scroll down one viewport
    ScrollPageDown,
    /// Scroll up one viewport
    ScrollPageUp,
    /// Jump to the top of the list
    ScrollTop,
    /// Jump to the bottom of the list
    ScrollBottom,

    // === Per-file view modes ===
    /// Collapse or expand the current file
    ToggleExpand,
    /// Switch the current file between diff and full-file view
    ToggleFullView,

    // === Bulk view modes ===
    ExpandAll,
    CollapseAll,

    // === Review progress ===
    /// Flip the viewed flag of the current file
    ToggleViewed,
    /// Revert the most recent single-file viewed change
    UndoViewed,
    MarkAllViewed,
    MarkAllUnviewed,
    /// Scroll to the next file that is not viewed yet
    FocusNextUnviewed,
    /// Scroll to a specific file by key
    FocusFile(String),

    // === Filtering ===
    /// Narrow the displayed files to paths ending with the suffix
    SetFilter(Option<String>),

    // === Delegated file operations ===
    DiscardFile,
    RevealFile,
    OpenInEditor,

    // === Viewport ===
    /// Set the viewport height (for scroll calculations)
    SetViewport { height: u32 },
}

impl ReviewAction {
    /// Check if this action only moves the viewport
    pub fn is_scroll(&self) -> bool {
        matches!(
            self,
            ReviewAction::ScrollDown(_)
                | ReviewAction::ScrollUp(_)
                | ReviewAction::ScrollPageDown
                | ReviewAction::ScrollPageUp
                | ReviewAction::ScrollTop
                | ReviewAction::ScrollBottom
        )
    }

    /// Check if this action is handed off to the host's file actions
    pub fn is_delegated(&self) -> bool {
        matches!(
            self,
            ReviewAction::DiscardFile | ReviewAction::RevealFile | ReviewAction::OpenInEditor
        )
    }
}
