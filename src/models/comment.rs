//! Comment model

use serde::{Deserialize, Serialize};

use super::LikeResult;

/// A comment or reply on a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Server-side ID
    pub id: i64,
    /// Post this comment belongs to
    pub post_id: i64,
    /// Author ID
    pub user_id: i64,
    /// Parent comment when this is a reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    /// Author name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Author avatar
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Body text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Publish time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<String>,
    /// Position within the post's comment list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<i64>,
    /// Whether the commenter wrote the post
    #[serde(default)]
    pub is_author: bool,
    /// Like count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<i64>,
    /// Coins received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coins: Option<i64>,
    /// Number of replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_count: Option<i64>,
    /// Whether the current user liked this comment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last edit time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Comment {
    /// Create a top-level comment
    pub fn new(id: i64, post_id: i64, content: &str) -> Self {
        Self {
            id,
            post_id,
            user_id: 0,
            parent_id: None,
            username: None,
            avatar: None,
            content: Some(content.to_string()),
            publish_time: None,
            floor: None,
            is_author: false,
            likes: None,
            coins: None,
            reply_count: None,
            is_liked: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Whether this comment replies to another comment
    pub const fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Floor label such as `#3`
    pub fn floor_label(&self) -> String {
        self.floor.map_or_else(String::new, |f| format!("#{f}"))
    }

    /// Apply a like toggle result from the server
    pub fn apply_like(&mut self, result: LikeResult) {
        self.likes = Some(result.likes);
        self.is_liked = Some(result.is_liked);
    }
}

/// Body for creating a comment or reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateCommentRequest {
    /// Target post
    pub post_id: i64,
    /// Parent comment for replies
    pub parent_id: Option<i64>,
    /// Body text
    pub content: String,
}

/// Body for editing a comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateCommentRequest {
    /// New body text
    pub content: String,
}
