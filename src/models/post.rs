//! Post model and the request/response types around it

use serde::{Deserialize, Serialize};

/// A forum post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Server-side ID
    pub id: i64,
    /// Board this post belongs to
    pub board_id: i64,
    /// Author ID
    pub user_id: i64,
    /// Title
    pub title: String,
    /// Body text
    pub content: String,
    /// Author display name
    #[serde(default)]
    pub publisher: String,
    /// Publish time as sent by the server
    #[serde(default)]
    pub publish_time: String,
    /// Coins received
    #[serde(default)]
    pub coins: i64,
    /// Times added to a folder
    #[serde(default)]
    pub favorites: i64,
    /// Like count
    #[serde(default)]
    pub likes: i64,
    /// Attached image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Attached file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    /// MIME-ish type of the attachment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_type: Option<String>,
    /// Number of comments
    #[serde(default)]
    pub comment_count: i64,
    /// Number of views
    #[serde(default)]
    pub view_count: i64,
    /// Time of the latest reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reply_time: Option<String>,
    /// Whether the current user liked this post
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    /// Whether the current user saved this post to a folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorited: Option<bool>,
}

impl Post {
    /// Create a post with counters at zero
    pub fn new(id: i64, board_id: i64, title: &str) -> Self {
        Self {
            id,
            board_id,
            user_id: 0,
            title: title.to_string(),
            content: String::new(),
            publisher: String::new(),
            publish_time: String::new(),
            coins: 0,
            favorites: 0,
            likes: 0,
            image_url: None,
            attachment_url: None,
            attachment_type: None,
            comment_count: 0,
            view_count: 0,
            last_reply_time: None,
            is_liked: None,
            is_favorited: None,
        }
    }

    /// Whether the current user liked this post
    pub fn liked(&self) -> bool {
        self.is_liked == Some(true)
    }

    /// Whether the current user saved this post
    pub fn favorited(&self) -> bool {
        self.is_favorited == Some(true)
    }

    /// Get a short preview of the content (for list display)
    pub fn preview(&self, max_chars: usize) -> String {
        let content = self.content.replace('\n', " ");
        if content.chars().count() <= max_chars {
            content
        } else {
            let cut: String = content.chars().take(max_chars.saturating_sub(3)).collect();
            format!("{cut}...")
        }
    }

    /// Apply a like toggle result from the server
    pub fn apply_like(&mut self, result: LikeResult) {
        self.likes = result.likes;
        self.is_liked = Some(result.is_liked);
    }

    /// Record a successful add-to-folder
    pub fn apply_favorite(&mut self) {
        self.favorites += 1;
        self.is_favorited = Some(true);
    }
}

/// Ordering for post lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostSort {
    /// Newest first
    #[default]
    Latest,
    /// Most recently replied
    Reply,
    /// Most popular
    Hot,
}

impl PostSort {
    /// Get all sort orders
    pub const fn all() -> &'static [Self] {
        &[Self::Latest, Self::Reply, Self::Hot]
    }

    /// Query-string value
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::Reply => "reply",
            Self::Hot => "hot",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "latest" | "new" => Some(Self::Latest),
            "reply" | "replied" => Some(Self::Reply),
            "hot" => Some(Self::Hot),
            _ => None,
        }
    }
}

impl std::fmt::Display for PostSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Body for creating or editing a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePostRequest {
    /// Target board
    pub board_id: i64,
    /// Title
    pub title: String,
    /// Body text
    pub content: String,
    /// Optional image URL (from the image host)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Payload returned by post creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CreatedPost {
    /// ID of the new post
    #[serde(alias = "id")]
    pub post_id: i64,
}

/// Result of a like toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeResult {
    /// Like count after the toggle
    pub likes: i64,
    /// Whether the current user now likes the target
    pub is_liked: bool,
}

/// Result of a coin action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoinResult {
    /// Coin total on the target after the action, if the server reports it
    #[serde(default)]
    pub coins: Option<i64>,
}

/// Body for coin actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoinRequest {
    /// Number of coins to give
    pub amount: u8,
}

/// Smallest coin amount a user can give in one action
pub const MIN_COIN_AMOUNT: u8 = 1;
/// Largest coin amount a user can give in one action
pub const MAX_COIN_AMOUNT: u8 = 10;
