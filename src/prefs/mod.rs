//! Preferences store
//!
//! Holds the session token, the cached profile, the server address, theme
//! choices and the image-host token. Everything is cached in memory and written
//! through on every change:
//!
//! - `preferences.toml` - non-secret values
//! - `credentials.enc` - session and image-host tokens (see [`vault`])
//!
//! Each write is serialized by an internal mutex. There are no multi-key
//! transactions; a login that stores a token and then a user is two writes.

pub mod vault;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::config::{DEFAULT_SERVER_URL, format_server_url};
use crate::models::User;
use crate::paths;
use crate::theme::{PrimaryColor, ThemeMode};
use vault::Vault;

const PREFERENCES_FILE: &str = "preferences.toml";
const CREDENTIALS_FILE: &str = "credentials.enc";

const KEY_TOKEN: &str = "token";
const KEY_IMAGE_HOST_TOKEN: &str = "image_host_token";

/// Non-secret values as they appear in `preferences.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    server_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    theme_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    primary_color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    use_dynamic_color: Option<bool>,
    /// Cached profile, stored as a JSON string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

#[derive(Debug, Default)]
struct Cache {
    prefs: StoredPreferences,
    secrets: HashMap<String, String>,
}

/// File-backed key-value store for session and preference data
#[derive(Debug)]
pub struct PreferencesStore {
    prefs_path: PathBuf,
    vault: Vault,
    cache: Mutex<Cache>,
}

impl PreferencesStore {
    /// Open the store under `~/.config/tranx/`
    pub fn open_default() -> Result<Self> {
        Self::open(&paths::tranx_dir()?)
    }

    /// Open (or start) a store in the given directory
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).context("Failed to create preferences directory")?;

        let prefs_path = dir.join(PREFERENCES_FILE);
        let prefs = if prefs_path.exists() {
            let content =
                fs::read_to_string(&prefs_path).context("Failed to read preferences file")?;
            toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable preferences file: {}", e);
                StoredPreferences::default()
            })
        } else {
            StoredPreferences::default()
        };

        let vault = Vault::new(dir.join(CREDENTIALS_FILE));
        let secrets = vault.load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable credentials file: {:#}", e);
            HashMap::new()
        });

        Ok(Self {
            prefs_path,
            vault,
            cache: Mutex::new(Cache { prefs, secrets }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Cache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_prefs(&self, prefs: &StoredPreferences) -> Result<()> {
        let content = toml::to_string_pretty(prefs).context("Failed to serialize preferences")?;
        fs::write(&self.prefs_path, content).context("Failed to write preferences file")
    }

    fn update_prefs(&self, f: impl FnOnce(&mut StoredPreferences)) -> Result<()> {
        let mut cache = self.lock();
        f(&mut cache.prefs);
        self.write_prefs(&cache.prefs)
    }

    fn secret(&self, key: &str) -> Option<String> {
        self.lock().secrets.get(key).cloned()
    }

    fn set_secret(&self, key: &str, value: Option<&str>) -> Result<()> {
        let mut cache = self.lock();
        match value {
            Some(v) => cache.secrets.insert(key.to_string(), v.to_string()),
            None => cache.secrets.remove(key),
        };
        self.vault.save(&cache.secrets)
    }

    // --- session -----------------------------------------------------------

    /// Session token
    pub fn token(&self) -> Option<String> {
        self.secret(KEY_TOKEN)
    }

    /// Store the session token
    pub fn set_token(&self, token: &str) -> Result<()> {
        self.set_secret(KEY_TOKEN, Some(token))
    }

    /// Forget the session token
    pub fn clear_token(&self) -> Result<()> {
        self.set_secret(KEY_TOKEN, None)
    }

    /// Last-known profile of the logged-in user
    pub fn user(&self) -> Option<User> {
        let raw = self.lock().prefs.user.clone()?;
        serde_json::from_str(&raw)
            .inspect_err(|e| tracing::warn!("Discarding unreadable cached user: {}", e))
            .ok()
    }

    /// Cache the logged-in user's profile
    pub fn set_user(&self, user: &User) -> Result<()> {
        let json = serde_json::to_string(user).context("Failed to serialize user")?;
        self.update_prefs(|p| p.user = Some(json))
    }

    /// Drop the cached profile
    pub fn clear_user(&self) -> Result<()> {
        self.update_prefs(|p| p.user = None)
    }

    /// True when both a token and a cached user are present
    pub fn is_logged_in(&self) -> bool {
        let cache = self.lock();
        cache.secrets.contains_key(KEY_TOKEN) && cache.prefs.user.is_some()
    }

    // --- server ------------------------------------------------------------

    /// Community server base URL (normalized)
    pub fn server_url(&self) -> String {
        self.lock()
            .prefs
            .server_url
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
    }

    /// Store a server URL, normalizing it first. Returns the stored value.
    pub fn set_server_url(&self, url: &str) -> Result<String> {
        let url = format_server_url(url);
        let stored = url.clone();
        self.update_prefs(|p| p.server_url = Some(stored))?;
        Ok(url)
    }

    /// Whether the user has ever configured a server
    pub fn has_server_url(&self) -> bool {
        self.lock().prefs.server_url.is_some()
    }

    // --- appearance --------------------------------------------------------

    /// Light/dark/system selection
    pub fn theme_mode(&self) -> ThemeMode {
        self.lock()
            .prefs
            .theme_mode
            .as_deref()
            .map(ThemeMode::from_stored)
            .unwrap_or_default()
    }

    /// Store the theme mode
    pub fn set_theme_mode(&self, mode: ThemeMode) -> Result<()> {
        self.update_prefs(|p| p.theme_mode = Some(mode.as_str().to_string()))
    }

    /// Accent color override; `None` when unset or stored as zero
    pub fn primary_color(&self) -> Option<PrimaryColor> {
        let raw = self.lock().prefs.primary_color?;
        PrimaryColor::from_argb(u64::from(raw))
    }

    /// Store an accent color override (masked to 32 bits; zero clears it)
    pub fn set_primary_color(&self, argb: u64) -> Result<()> {
        let color = PrimaryColor::from_argb(argb).map(|c| c.argb());
        self.update_prefs(|p| p.primary_color = color)
    }

    /// Remove the accent color override
    pub fn clear_primary_color(&self) -> Result<()> {
        self.update_prefs(|p| p.primary_color = None)
    }

    /// Whether to derive colors from the platform wallpaper
    pub fn use_dynamic_color(&self) -> bool {
        self.lock().prefs.use_dynamic_color.unwrap_or(false)
    }

    /// Toggle platform-derived colors
    pub fn set_use_dynamic_color(&self, enabled: bool) -> Result<()> {
        self.update_prefs(|p| p.use_dynamic_color = Some(enabled))
    }

    // --- image host --------------------------------------------------------

    /// Image-host API token
    pub fn image_host_token(&self) -> Option<String> {
        self.secret(KEY_IMAGE_HOST_TOKEN)
    }

    /// Store the image-host token; a blank value removes it
    pub fn set_image_host_token(&self, token: &str) -> Result<()> {
        let token = token.trim();
        let value = (!token.is_empty()).then_some(token);
        self.set_secret(KEY_IMAGE_HOST_TOKEN, value)
    }

    // --- housekeeping ------------------------------------------------------

    /// Remove every stored key
    pub fn clear_all(&self) -> Result<()> {
        let mut cache = self.lock();
        *cache = Cache::default();
        if self.prefs_path.exists() {
            fs::remove_file(&self.prefs_path).context("Failed to remove preferences file")?;
        }
        self.vault.clear()
    }
}
