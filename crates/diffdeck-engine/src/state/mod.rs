//! State management for the review list.

mod file_mode;
mod navigation;
mod review_state;
mod scheduler;
mod virtual_list;

pub use file_mode::FileViewMode;
pub use navigation::{next_unviewed, Highlight, NavigationState};
pub use review_state::ReviewState;
pub use scheduler::{drive_pending_work, ExpandScheduler};
pub use virtual_list::{RenderWindow, VirtualList};
