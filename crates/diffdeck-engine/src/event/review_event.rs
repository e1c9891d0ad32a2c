use crate::model::DiffStats;

/// Events emitted by the review state.
///
/// The engine is instrumented: it never performs I/O itself. Anything that
/// needs the outside world (persisting viewed state, fetching file content,
/// touching the working tree) is reported here and carried out by the host.
///
/// # Example
///
/// ```ignore
/// for event in state.handle_action(ReviewAction::ToggleViewed, Instant::now()) {
///     match event {
///         ReviewEvent::ViewedChanged { .. } | ReviewEvent::ViewedBulkChanged { .. } => {
///             store.persist(&session, &state.viewed_snapshot())?;
///         }
///         ReviewEvent::OpenInEditor { path } => actions.open_in_editor(&path)?,
///         _ => {}
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewEvent {
    /// Totals over the unfiltered file set were recomputed.
    StatsChanged(DiffStats),

    /// View modes changed for some files.
    ViewModesChanged {
        /// Monotonic counter, bumped once per update.
        revision: u64,
        /// Keys whose mode changed in this update.
        changed: Vec<String>,
    },

    /// One file's viewed flag changed.
    ViewedChanged {
        file_key: String,
        viewed: bool,
    },

    /// Every file's viewed flag was set at once, or stale entries were reset.
    ViewedBulkChanged {
        /// Number of files now viewed.
        viewed_count: usize,
    },

    /// The selected file changed.
    SelectionChanged {
        file_key: String,
        /// Position in the displayed list, if the file is displayed.
        index: Option<usize>,
    },

    /// Current file content is needed for full-file views.
    ContentNeeded {
        paths: Vec<String>,
    },

    /// Full-file view was requested but the patch could not be reversed.
    FullViewUnavailable {
        file_key: String,
    },

    /// User asked to discard the working-tree changes of a file.
    ///
    /// For renames `old_path` names the source, which must be restored too.
    DiscardFile {
        path: String,
        old_path: Option<String>,
    },

    /// User asked to reveal a file in the platform file manager.
    RevealFile { path: String },

    /// User asked to open a file in the configured editor.
    OpenInEditor { path: String },
}

impl ReviewEvent {
    /// Whether the host should persist the viewed ledger after this event.
    pub fn touches_ledger(&self) -> bool {
        matches!(
            self,
            ReviewEvent::ViewedChanged { .. } | ReviewEvent::ViewedBulkChanged { .. }
        )
    }
}
