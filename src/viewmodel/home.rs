//! Home feed

use crate::api::PostQuery;
use crate::error::ApiResult;
use crate::models::{Board, Folder, LikeResult, Post, PostSort};

use super::state::{PendingActions, StateCell, UiState};
use super::{
    Session, capped_posts, fetch_folders, patch_post, request_coin_post, request_favorite,
    request_like,
};

/// Posts and boards shown on the home screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeData {
    /// Posts in server order, at most one page
    pub posts: Vec<Post>,
    /// Boards for the filter bar (empty if they failed to load)
    pub boards: Vec<Board>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Filter {
    board_id: Option<i64>,
    sort: PostSort,
}

/// Home feed view-model
#[derive(Debug, Clone)]
pub struct HomeViewModel {
    session: Session,
    state: StateCell<UiState<HomeData>>,
    filter: StateCell<Filter>,
    folders: StateCell<Vec<Folder>>,
    pending: PendingActions,
}

impl HomeViewModel {
    /// New view-model in the `Loading` state; call [`Self::load`] to fetch
    pub fn new(session: Session) -> Self {
        Self {
            session,
            state: StateCell::new(UiState::Loading),
            filter: StateCell::new(Filter::default()),
            folders: StateCell::new(Vec::new()),
            pending: PendingActions::default(),
        }
    }

    /// Current state
    pub fn state(&self) -> UiState<HomeData> {
        self.state.get()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<UiState<HomeData>> {
        self.state.subscribe()
    }

    /// Selected board filter
    pub fn board_id(&self) -> Option<i64> {
        self.filter.get().board_id
    }

    /// Selected ordering
    pub fn sort(&self) -> PostSort {
        self.filter.get().sort
    }

    /// Folders the user can save posts into
    pub fn folders(&self) -> Vec<Folder> {
        self.folders.get()
    }

    /// In-flight actions
    pub fn pending(&self) -> &PendingActions {
        &self.pending
    }

    /// Fetch boards and the first page of posts.
    ///
    /// A board-list failure is tolerated; a post-list failure is not.
    pub async fn load(&self) {
        self.state.set(UiState::Loading);
        match self.fetch().await {
            Ok(data) => self.state.set(UiState::Success(data)),
            Err(e) => {
                tracing::warn!("Failed to load home feed: {}", e);
                self.state.set(UiState::Error(e.user_message()));
            }
        }
    }

    async fn fetch(&self) -> ApiResult<HomeData> {
        let token = self.session.require_token()?;
        let api = self.session.api()?;

        let boards = api.list_boards(&token).await.unwrap_or_else(|e| {
            tracing::warn!("Failed to load boards: {}", e);
            Vec::new()
        });

        let filter = self.filter.get();
        let page_size = self.session.config().page_size;
        let query = PostQuery {
            board_id: filter.board_id,
            sort: filter.sort,
            page: 1,
            page_size,
        };
        let posts = capped_posts(api.list_posts(&token, &query).await?, page_size);

        Ok(HomeData { posts, boards })
    }

    /// Filter by board (`None` for all boards) and reload
    pub async fn select_board(&self, board_id: Option<i64>) {
        self.filter.update(|f| f.board_id = board_id);
        self.load().await;
    }

    /// Change the ordering and reload
    pub async fn change_sort(&self, sort: PostSort) {
        self.filter.update(|f| f.sort = sort);
        self.load().await;
    }

    /// Toggle the like on a post
    pub async fn like_post(&self, post_id: i64) -> ApiResult<LikeResult> {
        let result = request_like(&self.session, &self.pending, post_id).await?;
        self.state
            .patch(|d| patch_post(&mut d.posts, post_id, |p| p.apply_like(result)));
        Ok(result)
    }

    /// Save a post into one of the user's folders
    pub async fn favorite_post(&self, post_id: i64, folder_id: i64) -> ApiResult<()> {
        request_favorite(&self.session, &self.pending, post_id, folder_id).await?;
        self.state
            .patch(|d| patch_post(&mut d.posts, post_id, Post::apply_favorite));
        Ok(())
    }

    /// Give 1-10 coins to a post; returns the new total
    pub async fn coin_post(&self, post_id: i64, amount: u8) -> ApiResult<i64> {
        let coins = request_coin_post(&self.session, &self.pending, post_id, amount).await?;
        self.state
            .patch(|d| patch_post(&mut d.posts, post_id, |p| p.coins = coins));
        Ok(coins)
    }

    /// Fetch the user's folders
    pub async fn load_folders(&self) -> ApiResult<()> {
        let folders = fetch_folders(&self.session).await?;
        self.folders.set(folders);
        Ok(())
    }

    /// Log out and wipe local data
    pub async fn logout(&self) -> ApiResult<()> {
        self.session.logout().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::testing::{FakeApi, session_with};
    use std::sync::Arc;

    async fn loaded(fake: &Arc<FakeApi>) -> (tempfile::TempDir, HomeViewModel) {
        let (dir, session) = session_with(fake, true);
        let vm = HomeViewModel::new(session);
        vm.load().await;
        (dir, vm)
    }

    fn post(vm: &HomeViewModel, id: i64) -> Post {
        vm.state()
            .data()
            .and_then(|d| d.posts.iter().find(|p| p.id == id).cloned())
            .unwrap()
    }

    #[tokio::test]
    async fn test_renders_one_page_in_server_order() {
        let fake = Arc::new(FakeApi::seeded());
        fake.with_state(|s| {
            for id in 20..60 {
                s.posts.push(Post::new(id, 1, "filler"));
            }
        });
        let (_dir, vm) = loaded(&fake).await;

        let data = vm.state().data().cloned().unwrap();
        assert_eq!(data.posts.len(), 20);
        let ids: Vec<i64> = data.posts.iter().map(|p| p.id).collect();
        let expected: Vec<i64> = (40..60).rev().collect();
        assert_eq!(ids, expected);
        assert_eq!(data.boards.len(), 2);
    }

    #[tokio::test]
    async fn test_oversized_page_is_capped() {
        let fake = Arc::new(FakeApi::seeded());
        fake.with_state(|s| {
            for id in 20..60 {
                s.posts.push(Post::new(id, 1, "filler"));
            }
            s.ignore_page_size = true;
        });
        let (_dir, vm) = loaded(&fake).await;

        let ids: Vec<i64> = vm.state().data().unwrap().posts.iter().map(|p| p.id).collect();
        let expected: Vec<i64> = (40..60).rev().collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_short_list_renders_everything() {
        let fake = Arc::new(FakeApi::seeded());
        let (_dir, vm) = loaded(&fake).await;
        let ids: Vec<i64> = vm.state().data().unwrap().posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_board_failure_is_tolerated() {
        let fake = Arc::new(FakeApi::seeded());
        fake.fail("list_boards");
        let (_dir, vm) = loaded(&fake).await;
        let data = vm.state().data().cloned().unwrap();
        assert!(data.boards.is_empty());
        assert_eq!(data.posts.len(), 3);
    }

    #[tokio::test]
    async fn test_post_failure_is_error() {
        let fake = Arc::new(FakeApi::seeded());
        fake.fail("list_posts");
        let (_dir, vm) = loaded(&fake).await;
        assert_eq!(vm.state().error(), Some("list_posts failed"));
    }

    #[tokio::test]
    async fn test_logged_out_load_is_error() {
        let fake = Arc::new(FakeApi::seeded());
        let (_dir, session) = session_with(&fake, false);
        let vm = HomeViewModel::new(session);
        vm.load().await;
        assert_eq!(vm.state().error(), Some("not logged in"));
        assert_eq!(fake.calls("list_posts"), 0);
    }

    #[tokio::test]
    async fn test_select_board_and_sort() {
        let fake = Arc::new(FakeApi::seeded());
        let (_dir, vm) = loaded(&fake).await;

        vm.select_board(Some(2)).await;
        assert_eq!(vm.board_id(), Some(2));
        let ids: Vec<i64> = vm.state().data().unwrap().posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3]);

        vm.change_sort(PostSort::Hot).await;
        assert_eq!(vm.sort(), PostSort::Hot);
        assert_eq!(vm.board_id(), Some(2));
    }

    #[tokio::test]
    async fn test_like_twice_round_trips() {
        let fake = Arc::new(FakeApi::seeded());
        let (_dir, vm) = loaded(&fake).await;
        let before = post(&vm, 1);

        let first = vm.like_post(1).await.unwrap();
        assert!(first.is_liked);
        assert_eq!(post(&vm, 1).likes, before.likes + 1);

        vm.like_post(1).await.unwrap();
        let after = post(&vm, 1);
        assert_eq!(after.likes, before.likes);
        assert_eq!(after.liked(), before.liked());
        assert!(!vm.pending().any());
    }

    #[tokio::test]
    async fn test_failed_favorite_leaves_state() {
        let fake = Arc::new(FakeApi::seeded());
        let (_dir, vm) = loaded(&fake).await;
        fake.fail("add_to_folder");
        let before = post(&vm, 2);

        let err = vm.favorite_post(2, 5).await.unwrap_err();
        assert!(matches!(err, ApiError::Server { .. }));

        let after = post(&vm, 2);
        assert_eq!(after.favorites, before.favorites);
        assert_eq!(after.is_favorited, before.is_favorited);
    }

    #[tokio::test]
    async fn test_favorite_and_coin_patch() {
        let fake = Arc::new(FakeApi::seeded());
        let (_dir, vm) = loaded(&fake).await;

        vm.load_folders().await.unwrap();
        let folder = vm.folders()[0].id;
        vm.favorite_post(2, folder).await.unwrap();
        let p = post(&vm, 2);
        assert_eq!(p.favorites, 1);
        assert!(p.favorited());

        assert_eq!(vm.coin_post(2, 3).await.unwrap(), 3);
        assert_eq!(post(&vm, 2).coins, 3);

        fake.with_state(|s| s.report_coins = false);
        assert_eq!(vm.coin_post(2, 4).await.unwrap(), 4);
        assert_eq!(post(&vm, 2).coins, 4);
    }

    #[tokio::test]
    async fn test_coin_amount_checked_locally() {
        let fake = Arc::new(FakeApi::seeded());
        let (_dir, vm) = loaded(&fake).await;
        assert!(matches!(vm.coin_post(1, 11).await, Err(ApiError::Invalid(_))));
        assert!(matches!(vm.coin_post(1, 0).await, Err(ApiError::Invalid(_))));
        assert_eq!(fake.calls("coin_post"), 0);
    }

    #[tokio::test]
    async fn test_action_on_error_state_calls_server_without_patch() {
        let fake = Arc::new(FakeApi::seeded());
        fake.fail("list_posts");
        let (_dir, vm) = loaded(&fake).await;

        vm.like_post(1).await.unwrap();
        assert_eq!(fake.calls("like_post"), 1);
        assert!(vm.state().error().is_some());
    }

    #[tokio::test]
    async fn test_logout_clears_prefs() {
        let fake = Arc::new(FakeApi::seeded());
        let (_dir, vm) = loaded(&fake).await;
        vm.logout().await.unwrap();
        assert!(!vm.session.prefs().is_logged_in());
    }
}
