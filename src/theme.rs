//! Theme preferences.
//!
//! Tranx does not render anything itself; these are the user's choices that a
//! front end reads back from the preferences store.

use serde::{Deserialize, Serialize};

/// Light/dark selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThemeMode {
    /// Always light
    Light,
    /// Always dark
    Dark,
    /// Follow the system setting
    #[default]
    System,
}

impl ThemeMode {
    /// Get all theme modes
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Light, Self::Dark, Self::System]
    }

    /// Stored name (`LIGHT`, `DARK`, `SYSTEM`)
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "LIGHT",
            Self::Dark => "DARK",
            Self::System => "SYSTEM",
        }
    }

    /// Parse a stored or user-entered name; unknown names yield `None`
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "LIGHT" => Some(Self::Light),
            "DARK" => Some(Self::Dark),
            "SYSTEM" | "AUTO" => Some(Self::System),
            _ => None,
        }
    }

    /// Parse a stored name, falling back to `System`
    #[must_use]
    pub fn from_stored(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }

    /// Get the next mode in rotation
    #[must_use]
    pub const fn next(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
            Self::System => Self::Light,
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
            Self::System => "System",
        };
        write!(f, "{name}")
    }
}

/// An ARGB color override for the accent color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimaryColor(u32);

impl PrimaryColor {
    /// Build from any integer, keeping the low 32 bits.
    ///
    /// Zero means "no override" and yields `None`.
    #[must_use]
    pub const fn from_argb(value: u64) -> Option<Self> {
        let masked = (value & 0xFFFF_FFFF) as u32;
        if masked == 0 { None } else { Some(Self(masked)) }
    }

    /// Raw ARGB value
    #[must_use]
    pub const fn argb(&self) -> u32 {
        self.0
    }

    /// Alpha channel
    #[must_use]
    pub const fn alpha(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Red, green and blue channels
    #[must_use]
    pub const fn rgb(&self) -> (u8, u8, u8) {
        ((self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8)
    }

    /// Parse `#RRGGBB` or `#AARRGGBB` (the `#` is optional)
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        let value = u32::from_str_radix(hex, 16).ok()?;
        match hex.len() {
            6 => Self::from_argb(u64::from(0xFF00_0000 | value)),
            8 => Self::from_argb(u64::from(value)),
            _ => None,
        }
    }

    /// Format as `#AARRGGBB`
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:08X}", self.0)
    }
}
