//! Ratatui widgets for the review list.

mod review_list;

pub use review_list::{FooterHint, ReviewListWidget};
