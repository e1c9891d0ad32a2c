//! Configuration and data directory paths
//!
//! Uses platform directories via the `dirs` crate.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/diffdeck/`, `~/.cache/diffdeck/`
//! - macOS: `~/Library/Application Support/diffdeck/`, `~/Library/Caches/diffdeck/`
//! - Windows: `%APPDATA%\diffdeck\`, `%LOCALAPPDATA%\diffdeck\`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "diffdeck";

/// Get the application config directory
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create config directory: {:?}", dir))?;
    Ok(dir)
}

/// Get the application cache directory (log files in release builds)
pub fn cache_dir() -> Result<PathBuf> {
    let base = dirs::cache_dir().context("Could not determine cache directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create cache directory: {:?}", dir))?;
    Ok(dir)
}

/// Directory holding one viewed-state file per review session
pub fn viewed_dir() -> Result<PathBuf> {
    Ok(config_dir()?.join("viewed"))
}
