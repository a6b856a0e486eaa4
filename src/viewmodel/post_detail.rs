//! Post detail with comments and replies

use std::collections::HashMap;

use crate::error::{ApiError, ApiResult};
use crate::models::{Comment, CreateCommentRequest, Folder, LikeResult, Post};

use super::state::{Action, PendingActions, StateCell, UiState};
use super::{
    Session, fetch_folders, request_coin_post, request_create_folder, request_favorite,
    request_like, validate_coin_amount,
};

/// A post and its top-level comments
#[derive(Debug, Clone, PartialEq)]
pub struct PostDetailData {
    pub post: Post,
    pub comments: Vec<Comment>,
}

/// Post detail view-model
#[derive(Debug, Clone)]
pub struct PostDetailViewModel {
    session: Session,
    post_id: i64,
    state: StateCell<UiState<PostDetailData>>,
    replies: StateCell<HashMap<i64, Vec<Comment>>>,
    folders: StateCell<Vec<Folder>>,
    pending: PendingActions,
}

impl PostDetailViewModel {
    pub fn new(session: Session, post_id: i64) -> Self {
        Self {
            session,
            post_id,
            state: StateCell::new(UiState::Loading),
            replies: StateCell::new(HashMap::new()),
            folders: StateCell::new(Vec::new()),
            pending: PendingActions::default(),
        }
    }

    pub const fn post_id(&self) -> i64 {
        self.post_id
    }

    pub fn state(&self) -> UiState<PostDetailData> {
        self.state.get()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<UiState<PostDetailData>> {
        self.state.subscribe()
    }

    /// Replies loaded so far, keyed by parent comment
    pub fn replies(&self) -> HashMap<i64, Vec<Comment>> {
        self.replies.get()
    }

    pub fn folders(&self) -> Vec<Folder> {
        self.folders.get()
    }

    pub fn pending(&self) -> &PendingActions {
        &self.pending
    }

    /// Fetch the post and its comments; a comment failure shows no comments
    pub async fn load(&self) {
        self.state.set(UiState::Loading);
        match self.fetch().await {
            Ok(data) => self.state.set(UiState::Success(data)),
            Err(e) => {
                tracing::warn!("Failed to load post {}: {}", self.post_id, e);
                self.state.set(UiState::Error(e.user_message()));
            }
        }
    }

    async fn fetch(&self) -> ApiResult<PostDetailData> {
        let token = self.session.require_token()?;
        let api = self.session.api()?;
        let post = api.get_post(&token, self.post_id).await?;

        let page_size = self.session.config().comment_page_size;
        let comments = match api.list_comments(&token, self.post_id, 1, page_size).await {
            Ok(page) => page.list,
            Err(e) => {
                tracing::warn!("Failed to load comments for post {}: {}", self.post_id, e);
                Vec::new()
            }
        };

        Ok(PostDetailData { post, comments })
    }

    /// Apply `f` to a comment wherever it appears (top level or reply list)
    fn patch_comment(&self, comment_id: i64, f: impl Fn(&mut Comment)) {
        self.state.patch(|d| {
            d.comments
                .iter_mut()
                .filter(|c| c.id == comment_id)
                .for_each(&f);
        });
        self.replies.try_update(|map| {
            let mut changed = false;
            for comment in map.values_mut().flatten().filter(|c| c.id == comment_id) {
                f(comment);
                changed = true;
            }
            changed
        });
    }

    /// Toggle the like on the post
    pub async fn like_post(&self) -> ApiResult<LikeResult> {
        let result = request_like(&self.session, &self.pending, self.post_id).await?;
        self.state.patch(|d| d.post.apply_like(result));
        Ok(result)
    }

    /// Save the post into a folder
    pub async fn favorite_post(&self, folder_id: i64) -> ApiResult<()> {
        request_favorite(&self.session, &self.pending, self.post_id, folder_id).await?;
        self.state.patch(|d| d.post.apply_favorite());
        Ok(())
    }

    pub async fn coin_post(&self, amount: u8) -> ApiResult<i64> {
        let coins = request_coin_post(&self.session, &self.pending, self.post_id, amount).await?;
        self.state.patch(|d| d.post.coins = coins);
        Ok(coins)
    }

    /// Give 1-10 coins to a comment; returns its new total
    pub async fn coin_comment(&self, comment_id: i64, amount: u8) -> ApiResult<i64> {
        let amount = validate_coin_amount(amount)?;
        let coins = {
            let _guard = self.pending.begin(Action::CoinComment(comment_id));
            let token = self.session.require_token()?;
            let result = self
                .session
                .api()?
                .coin_comment(&token, comment_id, amount)
                .await?;
            result.coins.unwrap_or_else(|| i64::from(amount))
        };
        self.patch_comment(comment_id, |c| c.coins = Some(coins));
        Ok(coins)
    }

    pub async fn like_comment(&self, comment_id: i64) -> ApiResult<LikeResult> {
        let result = {
            let _guard = self.pending.begin(Action::LikeComment(comment_id));
            let token = self.session.require_token()?;
            self.session.api()?.like_comment(&token, comment_id).await?
        };
        self.patch_comment(comment_id, |c| c.apply_like(result));
        Ok(result)
    }

    /// Post a comment, or a reply when `parent_id` is set.
    ///
    /// Afterwards a reply refreshes only its parent's reply list; a top-level
    /// comment reloads the whole post.
    pub async fn add_comment(&self, content: &str, parent_id: Option<i64>) -> ApiResult<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ApiError::invalid("comment must not be empty"));
        }
        let comment = {
            let _guard = self.pending.begin(Action::AddComment(self.post_id));
            let token = self.session.require_token()?;
            let request = CreateCommentRequest {
                post_id: self.post_id,
                parent_id,
                content: content.to_string(),
            };
            self.session.api()?.create_comment(&token, &request).await?
        };

        match parent_id {
            Some(parent) => {
                if let Err(e) = self.load_replies(parent).await {
                    tracing::warn!("Failed to refresh replies of {}: {}", parent, e);
                }
            }
            None => self.load().await,
        }
        Ok(comment)
    }

    /// Delete the post. The caller should navigate away on success.
    pub async fn delete_post(&self) -> ApiResult<()> {
        let _guard = self.pending.begin(Action::DeletePost(self.post_id));
        let token = self.session.require_token()?;
        self.session.api()?.delete_post(&token, self.post_id).await?;
        tracing::info!("Deleted post {}", self.post_id);
        Ok(())
    }

    /// Delete a comment, then reload the post
    pub async fn delete_comment(&self, comment_id: i64) -> ApiResult<()> {
        {
            let _guard = self.pending.begin(Action::DeleteComment(comment_id));
            let token = self.session.require_token()?;
            self.session.api()?.delete_comment(&token, comment_id).await?;
        }
        self.load().await;
        Ok(())
    }

    pub async fn load_folders(&self) -> ApiResult<()> {
        let folders = fetch_folders(&self.session).await?;
        self.folders.set(folders);
        Ok(())
    }

    pub async fn create_folder(
        &self,
        name: &str,
        description: Option<&str>,
        is_public: bool,
    ) -> ApiResult<i64> {
        let id =
            request_create_folder(&self.session, &self.pending, name, description, is_public)
                .await?;
        self.load_folders().await?;
        Ok(id)
    }

    /// Fetch the replies under one comment
    pub async fn load_replies(&self, comment_id: i64) -> ApiResult<()> {
        let token = self.session.require_token()?;
        let page_size = self.session.config().reply_page_size;
        let page = self
            .session
            .api()?
            .comment_replies(&token, comment_id, 1, page_size)
            .await?;
        self.replies.update(|map| {
            map.insert(comment_id, page.list);
        });
        Ok(())
    }
}
