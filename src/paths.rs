//! Common paths for Tranx data storage
//!
//! All Tranx data is stored under ~/.config/tranx/ on all platforms:
//! - config.toml - Client configuration
//! - preferences.toml - Server URL, theme and cached profile
//! - credentials.enc - Encrypted session and image-host tokens

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the Tranx data directory (~/.config/tranx/)
pub fn tranx_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let tranx_dir = home.join(".config").join("tranx");
    fs::create_dir_all(&tranx_dir).context("Failed to create tranx directory")?;
    Ok(tranx_dir)
}

/// Get the config file path (~/.config/tranx/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(tranx_dir()?.join("config.toml"))
}
