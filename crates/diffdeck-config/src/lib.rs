//! Configuration and persistence for diffdeck
//!
//! This crate provides:
//! - Platform paths for config and cache files
//! - Configuration file discovery (TOML)
//! - Application configuration (AppConfig)
//! - Viewed-state sessions, one file per review session

pub mod app_config;
pub mod config_file;
pub mod paths;
pub mod viewed_session;

pub use app_config::{AppConfig, LayoutConfig};
pub use config_file::load_config_file;
pub use paths::{cache_dir, config_dir, viewed_dir};
pub use viewed_session::{sanitize_session_id, ViewedEntry, ViewedSession};
