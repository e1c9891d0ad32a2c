//! Collaborator traits: everything the engine needs from the outside world.

mod content_provider;
mod diff_source;
mod file_actions;
mod theme_provider;
mod viewed_store;

pub use content_provider::{ContentError, FileContentProvider, NoContentProvider};
pub use diff_source::{DiffSource, SourceError};
pub use file_actions::{FileActionError, FileActions};
pub use theme_provider::{DefaultTheme, ThemeProvider};
pub use viewed_store::{MemoryViewedStore, StoreError, ViewedStore};
