//! Events emitted by the review state for the host to handle.

mod review_event;

pub use review_event::ReviewEvent;
