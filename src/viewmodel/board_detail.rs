//! Single board with its posts

use crate::api::PostQuery;
use crate::error::ApiResult;
use crate::models::{Board, Folder, LikeResult, Post, PostSort};

use super::state::{PendingActions, StateCell, UiState};
use super::{
    Session, capped_posts, fetch_folders, patch_post, request_coin_post, request_create_folder,
    request_favorite, request_like,
};

/// A board and its latest posts
#[derive(Debug, Clone, PartialEq)]
pub struct BoardDetailData {
    pub board: Board,
    pub posts: Vec<Post>,
}

/// Board detail view-model
#[derive(Debug, Clone)]
pub struct BoardDetailViewModel {
    session: Session,
    board_id: i64,
    state: StateCell<UiState<BoardDetailData>>,
    folders: StateCell<Vec<Folder>>,
    pending: PendingActions,
}

impl BoardDetailViewModel {
    pub fn new(session: Session, board_id: i64) -> Self {
        Self {
            session,
            board_id,
            state: StateCell::new(UiState::Loading),
            folders: StateCell::new(Vec::new()),
            pending: PendingActions::default(),
        }
    }

    pub const fn board_id(&self) -> i64 {
        self.board_id
    }

    pub fn state(&self) -> UiState<BoardDetailData> {
        self.state.get()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<UiState<BoardDetailData>> {
        self.state.subscribe()
    }

    pub fn folders(&self) -> Vec<Folder> {
        self.folders.get()
    }

    pub fn pending(&self) -> &PendingActions {
        &self.pending
    }

    /// Fetch the board and its posts; a post-list failure shows an empty board
    pub async fn load(&self) {
        self.state.set(UiState::Loading);
        match self.fetch().await {
            Ok(data) => self.state.set(UiState::Success(data)),
            Err(e) => {
                tracing::warn!("Failed to load board {}: {}", self.board_id, e);
                self.state.set(UiState::Error(e.user_message()));
            }
        }
    }

    async fn fetch(&self) -> ApiResult<BoardDetailData> {
        let token = self.session.require_token()?;
        let api = self.session.api()?;
        let board = api.get_board(&token, self.board_id).await?;

        let page_size = self.session.config().page_size;
        let query = PostQuery {
            board_id: Some(self.board_id),
            sort: PostSort::Latest,
            page: 1,
            page_size,
        };
        let posts = match api.list_posts(&token, &query).await {
            Ok(page) => capped_posts(page, page_size),
            Err(e) => {
                tracing::warn!("Failed to load posts for board {}: {}", self.board_id, e);
                Vec::new()
            }
        };

        Ok(BoardDetailData { board, posts })
    }

    pub async fn like_post(&self, post_id: i64) -> ApiResult<LikeResult> {
        let result = request_like(&self.session, &self.pending, post_id).await?;
        self.state
            .patch(|d| patch_post(&mut d.posts, post_id, |p| p.apply_like(result)));
        Ok(result)
    }

    pub async fn coin_post(&self, post_id: i64, amount: u8) -> ApiResult<i64> {
        let coins = request_coin_post(&self.session, &self.pending, post_id, amount).await?;
        self.state
            .patch(|d| patch_post(&mut d.posts, post_id, |p| p.coins = coins));
        Ok(coins)
    }

    /// Save a post into a folder
    pub async fn favorite_post(&self, post_id: i64, folder_id: i64) -> ApiResult<()> {
        request_favorite(&self.session, &self.pending, post_id, folder_id).await?;
        self.state
            .patch(|d| patch_post(&mut d.posts, post_id, Post::apply_favorite));
        Ok(())
    }

    pub async fn load_folders(&self) -> ApiResult<()> {
        let folders = fetch_folders(&self.session).await?;
        self.folders.set(folders);
        Ok(())
    }

    /// Create a folder, then refresh the folder list
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeApi, session_with};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_load_filters_to_board() {
        let fake = Arc::new(FakeApi::seeded());
        let (_dir, session) = session_with(&fake, true);
        let vm = BoardDetailViewModel::new(session, 1);
        vm.load().await;

        let data = vm.state().data().cloned().unwrap();
        assert_eq!(data.board.name, "General");
        assert!(data.posts.iter().all(|p| p.board_id == 1));
        assert_eq!(data.posts.len(), 2);
    }

    #[tokio::test]
    async fn test_oversized_page_is_capped() {
        let fake = Arc::new(FakeApi::seeded());
        fake.with_state(|s| {
            for id in 20..45 {
                s.posts.push(Post::new(id, 1, "filler"));
            }
            s.ignore_page_size = true;
        });
        let (_dir, session) = session_with(&fake, true);
        let vm = BoardDetailViewModel::new(session, 1);
        vm.load().await;

        let ids: Vec<i64> = vm.state().data().unwrap().posts.iter().map(|p| p.id).collect();
        let expected: Vec<i64> = (25..45).rev().collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_missing_board_is_error_but_missing_posts_are_not() {
        let fake = Arc::new(FakeApi::seeded());
        let (_dir, session) = session_with(&fake, true);

        let vm = BoardDetailViewModel::new(session.clone(), 99);
        vm.load().await;
        assert_eq!(vm.state().error(), Some("board not found"));

        fake.fail("list_posts");
        let vm = BoardDetailViewModel::new(session, 1);
        vm.load().await;
        assert!(vm.state().data().unwrap().posts.is_empty());
    }

    #[tokio::test]
    async fn test_folder_create_then_favorite() {
        let fake = Arc::new(FakeApi::seeded());
        let (_dir, session) = session_with(&fake, true);
        let vm = BoardDetailViewModel::new(session, 1);
        vm.load().await;

        let folder = vm.create_folder("Later", None, false).await.unwrap();
        assert_eq!(vm.folders().len(), 2);

        vm.favorite_post(1, folder).await.unwrap();
        let data = vm.state().data().cloned().unwrap();
        let post = data.posts.iter().find(|p| p.id == 1).unwrap();
        assert_eq!(post.favorites, 1);
        assert!(post.favorited());

        // Saving twice is rejected by the server; nothing changes locally
        assert!(vm.favorite_post(1, folder).await.is_err());
        let data = vm.state().data().cloned().unwrap();
        assert_eq!(data.posts.iter().find(|p| p.id == 1).unwrap().favorites, 1);
    }

    #[tokio::test]
    async fn test_like_and_coin() {
        let fake = Arc::new(FakeApi::seeded());
        let (_dir, session) = session_with(&fake, true);
        let vm = BoardDetailViewModel::new(session, 1);
        vm.load().await;

        let liked = vm.like_post(2).await.unwrap();
        assert_eq!(liked, LikeResult { likes: 1, is_liked: true });
        assert_eq!(vm.coin_post(2, 10).await.unwrap(), 10);

        let data = vm.state().data().cloned().unwrap();
        let post = data.posts.iter().find(|p| p.id == 2).unwrap();
        assert_eq!((post.likes, post.coins), (1, 10));
    }
}
