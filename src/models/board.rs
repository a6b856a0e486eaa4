//! Board and folder models

use serde::{Deserialize, Serialize};

/// A discussion board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Server-side ID
    pub id: i64,
    /// Board name
    pub name: String,
    /// Short description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Board avatar image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// ID of the user who created the board
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<i64>,
    /// Name of the user who created the board
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_name: Option<String>,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Board {
    /// Create a board with just an ID and name
    pub fn new(id: i64, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: None,
            avatar: None,
            creator_id: None,
            creator_name: None,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Body for creating a board
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateBoardRequest {
    /// Board name
    pub name: String,
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional avatar (usually an image-host URL)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// A user-owned collection of saved posts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    /// Server-side ID
    pub id: i64,
    /// Owner
    pub user_id: i64,
    /// Folder name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether other users can see the folder
    #[serde(default = "default_public")]
    pub is_public: bool,
    /// Number of saved posts
    #[serde(default)]
    pub item_count: i64,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last update time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

const fn default_public() -> bool {
    true
}

/// Body for creating a folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateFolderRequest {
    /// Folder name
    pub name: String,
    /// Optional description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Visibility
    pub is_public: bool,
}

/// Payload returned by folder creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CreatedFolder {
    /// ID of the new folder
    pub folder_id: i64,
}

/// Body for adding a post to a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddToFolderRequest {
    /// Post to save
    pub post_id: i64,
}
