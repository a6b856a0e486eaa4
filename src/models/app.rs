//! App-market models

use serde::{Deserialize, Serialize};

/// An entry in the app list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    /// Android package name (unique key)
    pub package_name: String,
    /// Display name
    pub name: String,
    /// Icon URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// Version name
    #[serde(default)]
    pub version: String,
    /// Package size in bytes
    #[serde(default)]
    pub size: u64,
    /// Average rating (0-5)
    #[serde(default)]
    pub rating: f32,
    /// Number of downloads
    #[serde(default)]
    pub download_count: u64,
}

/// Full app detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppDetail {
    /// Android package name
    pub package_name: String,
    /// Display name
    pub name: String,
    /// Icon URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
    /// Version name
    #[serde(default)]
    pub version: String,
    /// Version code
    #[serde(default)]
    pub version_code: i64,
    /// Package size in bytes
    #[serde(default)]
    pub size: u64,
    /// Average rating (0-5)
    #[serde(default)]
    pub rating: f32,
    /// Number of ratings
    #[serde(default)]
    pub rating_count: u64,
    /// Number of downloads
    #[serde(default)]
    pub download_count: u64,
    /// Coins received
    #[serde(default)]
    pub total_coins: i64,
    /// Main category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_category: Option<String>,
    /// Sub category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_category: Option<String>,
    /// Distribution channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Advertising level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_level: Option<String>,
    /// Payment model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_type: Option<String>,
    /// Operator type (indie, team, company)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_type: Option<String>,
    /// Screenshot URLs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshots: Option<Vec<String>>,
    /// Tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Long description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Changelog for this version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_content: Option<String>,
    /// Developer name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub developer_name: Option<String>,
    /// Uploader name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_name: Option<String>,
    /// Last update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
    /// APK download URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
}

/// Sub-category listing for a main category
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubCategories {
    /// Sub-category names
    #[serde(default)]
    pub sub_categories: Vec<String>,
}

/// Body for uploading an app listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadAppRequest {
    /// Android package name
    pub package_name: String,
    /// Display name
    pub name: String,
    /// Icon URL
    pub icon_url: Option<String>,
    /// Version name
    pub version: String,
    /// Version code
    pub version_code: i64,
    /// Package size in bytes
    pub size: u64,
    /// Distribution channel
    pub channel: String,
    /// Main category
    pub main_category: String,
    /// Sub category
    pub sub_category: String,
    /// Screenshot URLs
    pub screenshots: Option<Vec<String>>,
    /// Long description
    pub description: Option<String>,
    /// Share blurb
    pub share_desc: Option<String>,
    /// Changelog
    pub update_content: Option<String>,
    /// Developer name
    pub developer_name: Option<String>,
    /// Advertising level
    pub ad_level: String,
    /// Payment model
    pub payment_type: String,
    /// Operator type
    pub operation_type: String,
    /// APK download URL
    pub download_url: Option<String>,
}

/// Body for coining an app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppCoinRequest {
    /// Number of coins
    pub coins: u32,
}

/// Ordering for the app list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppSort {
    /// Most downloaded
    #[default]
    Download,
    /// Best rated
    Rating,
    /// Recently updated
    Update,
}

impl AppSort {
    /// Query-string value
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Rating => "rating",
            Self::Update => "update",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "download" | "downloads" => Some(Self::Download),
            "rating" => Some(Self::Rating),
            "update" | "updated" => Some(Self::Update),
            _ => None,
        }
    }
}

/// Human-readable channel name
pub fn channel_name(channel: &str) -> &str {
    match channel {
        "official" => "Official",
        "international" => "International",
        "modified" => "Modified",
        other => other,
    }
}

/// Format a byte count as `B`, `KB`, `MB` or `GB`
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let b = bytes as f64;
    if bytes < 1024 {
        format!("{bytes} B")
    } else if b < KB * KB {
        format!("{:.1} KB", b / KB)
    } else if b < KB * KB * KB {
        format!("{:.1} MB", b / (KB * KB))
    } else {
        format!("{:.1} GB", b / (KB * KB * KB))
    }
}

/// Compact download count: `999`, `1.5K`, `42K`, `12.3W` (W = 10 000)
pub fn format_download_count(count: u64) -> String {
    match count {
        0..1_000 => count.to_string(),
        1_000..10_000 => format!("{:.1}K", count as f64 / 1_000.0),
        10_000..100_000 => format!("{}K", count / 1_000),
        _ => format!("{:.1}W", count as f64 / 10_000.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_format_download_count() {
        assert_eq!(format_download_count(999), "999");
        assert_eq!(format_download_count(1_500), "1.5K");
        assert_eq!(format_download_count(42_000), "42K");
        assert_eq!(format_download_count(123_000), "12.3W");
    }
}
