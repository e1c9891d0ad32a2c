//! # diffdeck-engine
//!
//! A diff review engine: split a multi-file unified diff into per-file
//! records, track which files have been reviewed, and lay out the file list
//! so that only the visible part is ever rendered.
//!
//! ## Design Principles
//!
//! The engine is **instrumented**: it receives data and emits events without
//! doing I/O itself. Fetching the diff, reading file contents, persisting the
//! viewed ledger and touching the working tree are all left to the host
//! through the collaborator traits in [`traits`].
//!
//! - [`parser::split`] turns a diff blob into [`FileDiffRecord`]s.
//! - [`patch::reconstruct_old_content`] reverses a file's patch to recover
//!   the pre-change text for full-file views.
//! - [`ledger::ViewedLedger`] keeps content-addressed "viewed" flags with undo.
//! - [`ReviewState`] owns view modes, navigation and the virtualized layout,
//!   and defers heavy work to [`ReviewState::tick`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use diffdeck_engine::{EngineConfig, ReviewAction, ReviewState};
//! use std::time::Instant;
//!
//! let mut state = ReviewState::new(EngineConfig::default());
//! state.set_diff_text(&diff_text);
//!
//! // Once per frame
//! for event in state.tick(Instant::now()) {
//!     // ContentNeeded, ViewedChanged, ...
//! }
//!
//! // Input mapped to actions by the host
//! let events = state.handle_action(ReviewAction::ToggleViewed, Instant::now());
//! ```

pub mod action;
pub mod config;
pub mod event;
pub mod ledger;
pub mod model;
pub mod parser;
pub mod patch;
pub mod prefetch;
pub mod render;
pub mod state;
pub mod traits;
pub mod widget;

// Re-export commonly used types
pub use action::ReviewAction;
pub use config::{EngineConfig, HeightModel};
pub use event::ReviewEvent;
pub use ledger::{ViewedLedger, ViewedState};
pub use model::{DiffStats, FileDiffRecord, FileStatus};
pub use prefetch::{prefetch_contents, PrefetchOutcome};
pub use render::FileBody;
pub use state::{drive_pending_work, FileViewMode, ReviewState};
pub use traits::{
    ContentError, DefaultTheme, DiffSource, FileActionError, FileActions, FileContentProvider,
    SourceError, StoreError, ThemeProvider, ViewedStore,
};
pub use widget::{FooterHint, ReviewListWidget};
