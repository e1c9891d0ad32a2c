//! Application configuration
//!
//! Configuration loaded from `.diffdeck.toml`. Every field is optional in
//! the file; missing ones take their defaults.

use serde::{Deserialize, Serialize};

/// Application configuration loaded from `.diffdeck.toml`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Command to open files in an editor (e.g., "code", "zed", "cursor")
    #[serde(default = "default_ide_command")]
    pub ide_command: String,

    /// Command to reveal a file in the platform file manager
    #[serde(default = "default_reveal_command")]
    pub reveal_command: String,

    /// Files with more changed lines than this are shown as a placeholder
    #[serde(default = "default_large_diff_threshold")]
    pub large_diff_threshold: usize,

    /// Files expanded per frame during a batched expand-all
    #[serde(default = "default_expand_batch_size")]
    pub expand_batch_size: usize,

    /// Expand-all over at most this many files happens at once
    #[serde(default = "default_atomic_expand_limit")]
    pub atomic_expand_limit: usize,

    /// Number of viewed toggles that can be undone
    #[serde(default = "default_undo_capacity")]
    pub undo_capacity: usize,

    /// Duration of the focus highlight, in milliseconds
    #[serde(default = "default_highlight_ms")]
    pub highlight_ms: u64,

    /// Maximum concurrent file reads for full-file views
    #[serde(default = "default_prefetch_concurrency")]
    pub prefetch_concurrency: usize,

    /// Height model, in terminal rows
    #[serde(default)]
    pub layout: LayoutConfig,
}

/// Height model for the file list, in terminal rows
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct LayoutConfig {
    pub per_line_height: u32,
    pub header_height: u32,
    pub collapsed_height: u32,
    pub min_height: u32,
    pub max_height: u32,
    pub overscan: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            per_line_height: 1,
            header_height: 2,
            collapsed_height: 1,
            min_height: 4,
            max_height: 60,
            overscan: 2,
        }
    }
}

fn default_ide_command() -> String {
    "code".to_string() // Default to VS Code
}

fn default_reveal_command() -> String {
    if cfg!(target_os = "macos") {
        "open -R".to_string()
    } else if cfg!(target_os = "windows") {
        "explorer /select,".to_string()
    } else {
        "xdg-open".to_string()
    }
}

fn default_large_diff_threshold() -> usize {
    2000
}

fn default_expand_batch_size() -> usize {
    5
}

fn default_atomic_expand_limit() -> usize {
    10
}

fn default_undo_capacity() -> usize {
    50
}

fn default_highlight_ms() -> u64 {
    2000
}

fn default_prefetch_concurrency() -> usize {
    20
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ide_command: default_ide_command(),
            reveal_command: default_reveal_command(),
            large_diff_threshold: default_large_diff_threshold(),
            expand_batch_size: default_expand_batch_size(),
            atomic_expand_limit: default_atomic_expand_limit(),
            undo_capacity: default_undo_capacity(),
            highlight_ms: default_highlight_ms(),
            prefetch_concurrency: default_prefetch_concurrency(),
            layout: LayoutConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        match crate::load_config_file() {
            Some(content) => Self::parse_or_default(&content),
            None => {
                log::debug!("Using default app config");
                Self::default()
            }
        }
    }

    /// Parse config content, falling back to defaults on error
    pub fn parse_or_default(content: &str) -> Self {
        match toml::from_str(content) {
            Ok(config) => {
                log::info!("Loaded app config from file");
                config
            }
            Err(e) => {
                log::warn!("Failed to parse config file: {}", e);
                Self::default()
            }
        }
    }
}
