//! Configuration module for Tranx

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paths;

/// Server address used until the user configures one
pub const DEFAULT_SERVER_URL: &str = "http://localhost:4999";

/// Base URL of the third-party image host
pub const DEFAULT_IMAGE_HOST_URL: &str = "https://picui.cn/api/v1";

/// How images are pushed to the image host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadMode {
    /// Multipart upload authorized with the long-lived bearer token
    #[default]
    Direct,
    /// Exchange the bearer token for a single-use upload token first
    TokenExchange,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Image host API base URL
    #[serde(default = "default_image_host_url")]
    pub image_host_url: String,

    /// Image upload flow
    #[serde(default)]
    pub upload_mode: UploadMode,

    /// TCP connect timeout in seconds
    #[serde(default = "default_timeout")]
    pub connect_timeout_secs: u64,

    /// Response read timeout in seconds
    #[serde(default = "default_timeout")]
    pub read_timeout_secs: u64,

    /// Number of posts to fetch per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Number of comments to fetch with a post
    #[serde(default = "default_comment_page_size")]
    pub comment_page_size: u32,

    /// Number of replies to fetch under a comment
    #[serde(default = "default_page_size")]
    pub reply_page_size: u32,
}

fn default_image_host_url() -> String {
    DEFAULT_IMAGE_HOST_URL.to_string()
}

const fn default_timeout() -> u64 {
    30
}

const fn default_page_size() -> u32 {
    20
}

const fn default_comment_page_size() -> u32 {
    50
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_host_url: default_image_host_url(),
            upload_mode: UploadMode::default(),
            connect_timeout_secs: default_timeout(),
            read_timeout_secs: default_timeout(),
            page_size: default_page_size(),
            comment_page_size: default_comment_page_size(),
            reply_page_size: default_page_size(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        paths::config_path()
    }

    /// Load config from the default path or create default
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_from(&path)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }
}

/// Split off an `http`/`https` scheme, matched case-insensitively
fn split_scheme(url: &str) -> Option<(&'static str, &str)> {
    ["https", "http"].into_iter().find_map(|scheme| {
        let prefix = url.get(..scheme.len() + 3)?;
        prefix
            .eq_ignore_ascii_case(&format!("{scheme}://"))
            .then(|| (scheme, &url[prefix.len()..]))
    })
}

/// Normalize a user-entered server address.
///
/// Trims whitespace, lowercases the scheme (prepending `http://` when none is
/// given) and drops trailing slashes. Applying it twice yields the same string.
pub fn format_server_url(url: &str) -> String {
    let url = url.trim();
    let (scheme, rest) = split_scheme(url).unwrap_or(("http", url));
    format!("{scheme}://{}", rest.trim_end_matches('/'))
}

/// Whether a server address carries an HTTP(S) scheme and a host
pub fn validate_server_url(url: &str) -> bool {
    split_scheme(url.trim()).is_some_and(|(_, rest)| !rest.trim_matches('/').is_empty())
}

/// Whether requests to this base URL travel over plain HTTP
pub fn is_plain_http(url: &str) -> bool {
    matches!(split_scheme(url.trim_start()), Some(("http", _)))
}
