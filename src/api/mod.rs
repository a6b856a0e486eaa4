//! Clients for the community server and the image host

pub mod client;
pub mod image_host;

use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::Config;
use crate::error::ApiResult;
use crate::models::{
    App, AppDetail, AppSort, Board, CheckinResponse, CheckinStatus, CoinResult, Comment,
    CreateBoardRequest, CreateCommentRequest, CreateFolderRequest, CreatePostRequest,
    CreatedFolder, CreatedPost, Folder, LikeResult, LoginRequest, LoginResponse, Page, Post,
    PostSort, RegisterRequest, RegisterResponse, SubCategories, UploadAppRequest, User,
    UserStats,
};

pub use client::{ClientSettings, HttpApiClient};

/// Filter and paging for the post list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    /// Restrict to one board
    pub board_id: Option<i64>,
    /// Ordering
    pub sort: PostSort,
    /// Page number (1-based)
    pub page: u32,
    /// Page size
    pub page_size: u32,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            board_id: None,
            sort: PostSort::Latest,
            page: 1,
            page_size: 20,
        }
    }
}

/// Filter and paging for the app list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppQuery {
    /// Restrict to one main category
    pub category: Option<String>,
    /// Ordering
    pub sort: AppSort,
    /// Page number (1-based)
    pub page: u32,
    /// Page size
    pub page_size: u32,
}

impl Default for AppQuery {
    fn default() -> Self {
        Self {
            category: None,
            sort: AppSort::Download,
            page: 1,
            page_size: 20,
        }
    }
}

/// One operation per community REST endpoint.
///
/// `token` is the session token sent in the `Token` header; an empty string
/// sends no header.
#[async_trait]
pub trait CommunityApi: Send + Sync {
    // Auth
    async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse>;
    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse>;
    async fn logout(&self, token: &str) -> ApiResult<()>;

    // Users
    async fn current_user(&self, token: &str) -> ApiResult<User>;
    async fn get_user(&self, token: &str, user_id: i64) -> ApiResult<User>;
    async fn list_users(&self, token: &str, page: u32, page_size: u32) -> ApiResult<Page<User>>;
    async fn user_stats(&self, token: &str, user_id: i64) -> ApiResult<UserStats>;

    // Follow
    async fn follow(&self, token: &str, user_id: i64) -> ApiResult<()>;
    async fn unfollow(&self, token: &str, user_id: i64) -> ApiResult<()>;
    async fn following(
        &self,
        token: &str,
        user_id: i64,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Page<User>>;
    async fn followers(
        &self,
        token: &str,
        user_id: i64,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Page<User>>;

    // Check-in
    async fn checkin(&self, token: &str) -> ApiResult<CheckinResponse>;
    async fn checkin_status(&self, token: &str) -> ApiResult<CheckinStatus>;

    // Boards
    async fn list_boards(&self, token: &str) -> ApiResult<Vec<Board>>;
    async fn get_board(&self, token: &str, board_id: i64) -> ApiResult<Board>;
    async fn create_board(&self, token: &str, request: &CreateBoardRequest) -> ApiResult<Board>;

    // Posts
    async fn create_post(&self, token: &str, request: &CreatePostRequest)
    -> ApiResult<CreatedPost>;
    async fn list_posts(&self, token: &str, query: &PostQuery) -> ApiResult<Page<Post>>;
    async fn get_post(&self, token: &str, post_id: i64) -> ApiResult<Post>;
    async fn update_post(
        &self,
        token: &str,
        post_id: i64,
        request: &CreatePostRequest,
    ) -> ApiResult<()>;
    async fn delete_post(&self, token: &str, post_id: i64) -> ApiResult<()>;
    /// Toggle the like; the server answers with the new state
    async fn like_post(&self, token: &str, post_id: i64) -> ApiResult<LikeResult>;
    async fn unlike_post(&self, token: &str, post_id: i64) -> ApiResult<()>;
    async fn favorite_post(&self, token: &str, post_id: i64) -> ApiResult<()>;
    async fn coin_post(&self, token: &str, post_id: i64, amount: u8) -> ApiResult<CoinResult>;

    // Comments
    async fn create_comment(
        &self,
        token: &str,
        request: &CreateCommentRequest,
    ) -> ApiResult<Comment>;
    async fn list_comments(
        &self,
        token: &str,
        post_id: i64,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Page<Comment>>;
    async fn update_comment(&self, token: &str, comment_id: i64, content: &str) -> ApiResult<()>;
    async fn delete_comment(&self, token: &str, comment_id: i64) -> ApiResult<()>;
    async fn like_comment(&self, token: &str, comment_id: i64) -> ApiResult<LikeResult>;
    async fn coin_comment(
        &self,
        token: &str,
        comment_id: i64,
        amount: u8,
    ) -> ApiResult<CoinResult>;
    async fn comment_replies(
        &self,
        token: &str,
        comment_id: i64,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Page<Comment>>;

    // Folders
    async fn create_folder(
        &self,
        token: &str,
        request: &CreateFolderRequest,
    ) -> ApiResult<CreatedFolder>;
    async fn my_folders(&self, token: &str) -> ApiResult<Vec<Folder>>;
    async fn add_to_folder(&self, token: &str, folder_id: i64, post_id: i64) -> ApiResult<()>;

    // App market
    async fn list_apps(&self, query: &AppQuery) -> ApiResult<Page<App>>;
    async fn app_categories(&self) -> ApiResult<Vec<String>>;
    async fn app_sub_categories(&self, main_category: &str) -> ApiResult<SubCategories>;
    async fn app_detail(&self, package_name: &str) -> ApiResult<AppDetail>;
    async fn coin_app(&self, token: &str, package_name: &str, coins: u32) -> ApiResult<()>;
    async fn record_download(&self, package_name: &str) -> ApiResult<()>;
    async fn upload_app(&self, token: &str, request: &UploadAppRequest) -> ApiResult<()>;
}

type Factory = Box<dyn Fn(&str) -> ApiResult<Arc<dyn CommunityApi>> + Send + Sync>;

struct Current {
    base_url: String,
    api: Arc<dyn CommunityApi>,
}

/// Hands out the shared API client, rebuilding it only when the base URL
/// changes.
pub struct ClientProvider {
    factory: Factory,
    current: RwLock<Option<Current>>,
}

impl ClientProvider {
    /// Provider that builds [`HttpApiClient`]s with the configured timeouts
    pub fn http(config: &Config) -> Self {
        let settings = ClientSettings::from(config);
        Self::with_factory(move |base_url| {
            let client = HttpApiClient::new(base_url, &settings)?;
            Ok(Arc::new(client) as Arc<dyn CommunityApi>)
        })
    }

    /// Provider with a custom constructor
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn(&str) -> ApiResult<Arc<dyn CommunityApi>> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            current: RwLock::new(None),
        }
    }

    /// Provider that always hands out the same client
    pub fn fixed(api: Arc<dyn CommunityApi>) -> Self {
        Self::with_factory(move |_| Ok(Arc::clone(&api)))
    }

    /// Client for `base_url`
    pub fn client(&self, base_url: &str) -> ApiResult<Arc<dyn CommunityApi>> {
        {
            let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(c) = current.as_ref().filter(|c| c.base_url == base_url) {
                return Ok(Arc::clone(&c.api));
            }
        }

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(c) = current.as_ref().filter(|c| c.base_url == base_url) {
            return Ok(Arc::clone(&c.api));
        }

        tracing::debug!("Building API client for {}", base_url);
        let api = (self.factory)(base_url)?;
        *current = Some(Current {
            base_url: base_url.to_string(),
            api: Arc::clone(&api),
        });
        Ok(api)
    }

    /// Base URL of the client built last, if any
    pub fn base_url(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|c| c.base_url.clone())
    }

    /// Drop the cached client so the next call rebuilds it
    pub fn reset(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl std::fmt::Debug for ClientProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientProvider")
            .field("base_url", &self.base_url())
            .finish_non_exhaustive()
    }
}
