//! Review bookkeeping: the content-addressed viewed ledger and its undo stack.

mod undo;
mod viewed;

pub use undo::{UndoEntry, UndoStack, DEFAULT_UNDO_CAPACITY};
pub use viewed::{content_hash, ViewedLedger, ViewedState};
