//! In-memory community server for tests

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tempfile::TempDir;

use crate::api::{AppQuery, ClientProvider, CommunityApi, PostQuery};
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    App, AppDetail, Board, CheckinResponse, CheckinStatus, CoinResult, Comment,
    CreateBoardRequest, CreateCommentRequest, CreateFolderRequest, CreatePostRequest,
    CreatedFolder, CreatedPost, Folder, LikeResult, LoginRequest, LoginResponse, Page, Post,
    PostSort, RegisterRequest, RegisterResponse, SubCategories, UploadAppRequest, User,
    UserStats,
};
use crate::prefs::PreferencesStore;
use crate::viewmodel::Session;

/// The only session token the fake accepts
pub const TOKEN: &str = "fake-session-token";
/// Password of every seeded user
pub const PASSWORD: &str = "password123";

/// Server-side data; tests may reach in through [`FakeApi::with_state`]
#[derive(Debug, Default)]
pub struct FakeState {
    pub users: Vec<User>,
    pub boards: Vec<Board>,
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub folders: Vec<Folder>,
    pub folder_posts: Vec<(i64, i64)>,
    pub liked_posts: HashSet<i64>,
    pub liked_comments: HashSet<i64>,
    pub apps: Vec<AppDetail>,
    pub categories: Vec<String>,
    pub checked_in: bool,
    /// When false, coin endpoints answer without a `coins` total
    pub report_coins: bool,
    /// When true, post lists return every match regardless of page size
    pub ignore_page_size: bool,
    next_id: i64,
}

impl FakeState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn me(&self) -> User {
        self.users
            .first()
            .cloned()
            .unwrap_or_else(|| User::new(1, "alice"))
    }
}

/// Fake [`CommunityApi`] that mirrors every write perfectly
#[derive(Debug, Default)]
pub struct FakeApi {
    state: Mutex<FakeState>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn paginate<T: Clone>(items: &[T], page: u32, page_size: u32) -> Page<T> {
    let start = (page.saturating_sub(1) * page_size) as usize;
    let list: Vec<T> = items
        .iter()
        .skip(start)
        .take(page_size as usize)
        .cloned()
        .collect();
    Page {
        total: items.len() as i64,
        page,
        page_size,
        list,
    }
}

fn app_summary(detail: &AppDetail) -> App {
    App {
        package_name: detail.package_name.clone(),
        name: detail.name.clone(),
        icon_url: detail.icon_url.clone(),
        version: detail.version.clone(),
        size: detail.size,
        rating: detail.rating,
        download_count: detail.download_count,
    }
}

/// App detail with every optional field empty
pub fn app_detail(package_name: &str, name: &str, category: &str) -> AppDetail {
    AppDetail {
        package_name: package_name.to_string(),
        name: name.to_string(),
        icon_url: None,
        version: "1.0".to_string(),
        version_code: 1,
        size: 1024,
        rating: 4.5,
        rating_count: 10,
        download_count: 100,
        total_coins: 0,
        main_category: Some(category.to_string()),
        sub_category: None,
        channel: None,
        ad_level: None,
        payment_type: None,
        operation_type: None,
        screenshots: None,
        tags: None,
        description: None,
        update_content: None,
        developer_name: None,
        uploader_name: None,
        update_time: None,
        download_url: None,
    }
}

impl FakeApi {
    /// Empty server
    pub fn new() -> Self {
        let fake = Self::default();
        fake.with_state(|s| s.report_coins = true);
        fake
    }

    /// Server with one user, two boards, three posts and a couple of comments
    pub fn seeded() -> Self {
        let fake = Self::new();
        fake.with_state(|s| {
            let mut alice = User::new(1, "alice");
            alice.level = 2;
            alice.exp = Some(150);
            alice.coins = 100;
            s.users.push(alice);

            s.boards.push(Board::new(1, "General"));
            s.boards.push(Board::new(2, "Apps"));

            for (id, board, title) in [(1, 1, "Hello"), (2, 1, "Second"), (3, 2, "Release")] {
                let mut post = Post::new(id, board, title);
                post.user_id = 1;
                post.content = format!("{title} body");
                s.posts.push(post);
            }

            s.comments.push(Comment::new(10, 1, "first!"));
            let mut reply = Comment::new(11, 1, "welcome");
            reply.parent_id = Some(10);
            s.comments.push(reply);

            s.folders.push(Folder {
                id: 5,
                user_id: 1,
                name: "Saved".to_string(),
                description: None,
                is_public: true,
                item_count: 0,
                created_at: None,
                updated_at: None,
            });

            s.categories = vec!["games".to_string(), "tools".to_string()];
            s.next_id = 100;
        });
        fake
    }

    /// Add `count` apps in `category`
    pub fn add_apps(&self, category: &str, count: usize) {
        self.with_state(|s| {
            let start = s.apps.len();
            for i in start..start + count {
                s.apps.push(app_detail(
                    &format!("com.example.app{i}"),
                    &format!("App {i}"),
                    category,
                ));
            }
        });
    }

    /// Inspect or modify server data
    pub fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        f(&mut lock(&self.state))
    }

    /// Make `endpoint` answer with a server error from now on
    pub fn fail(&self, endpoint: &'static str) {
        lock(&self.failing).insert(endpoint);
    }

    /// Let `endpoint` succeed again
    pub fn recover(&self, endpoint: &'static str) {
        lock(&self.failing).remove(endpoint);
    }

    /// How often `endpoint` was called
    pub fn calls(&self, endpoint: &str) -> usize {
        lock(&self.calls).get(endpoint).copied().unwrap_or(0)
    }

    fn enter(&self, endpoint: &'static str) -> ApiResult<()> {
        *lock(&self.calls).entry(endpoint).or_default() += 1;
        if lock(&self.failing).contains(endpoint) {
            return Err(ApiError::Server {
                code: 500,
                message: format!("{endpoint} failed"),
            });
        }
        Ok(())
    }

    fn authed(&self, endpoint: &'static str, token: &str) -> ApiResult<MutexGuard<'_, FakeState>> {
        self.enter(endpoint)?;
        if token != TOKEN {
            return Err(ApiError::Server {
                code: 401,
                message: "unauthorized".to_string(),
            });
        }
        Ok(lock(&self.state))
    }

    fn not_found(what: &str) -> ApiError {
        ApiError::Server {
            code: 404,
            message: format!("{what} not found"),
        }
    }
}

/// A session over `fake` with its own temporary preference directory
pub fn session_with(fake: &Arc<FakeApi>, logged_in: bool) -> (TempDir, Session) {
    let dir = tempfile::tempdir().unwrap();
    let prefs = PreferencesStore::open(dir.path()).unwrap();
    if logged_in {
        prefs.set_token(TOKEN).unwrap();
        prefs.set_user(&User::new(1, "alice")).unwrap();
    }
    let api: Arc<dyn CommunityApi> = fake.clone();
    let provider = ClientProvider::fixed(api);
    let session = Session::new(Arc::new(provider), Arc::new(prefs), Config::default());
    (dir, session)
}

#[async_trait]
impl CommunityApi for FakeApi {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        self.enter("register")?;
        let mut s = lock(&self.state);
        if s.users.iter().any(|u| u.username == request.username) {
            return Err(ApiError::Server {
                code: 409,
                message: "username taken".to_string(),
            });
        }
        let id = s.next_id();
        s.users.push(User::new(id, &request.username));
        Ok(RegisterResponse {
            user_id: id,
            username: request.username.clone(),
        })
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.enter("login")?;
        let s = lock(&self.state);
        match s.users.iter().find(|u| u.username == request.username) {
            Some(user) if request.password == PASSWORD => Ok(LoginResponse {
                token: TOKEN.to_string(),
                user: user.clone(),
                expires_at: None,
            }),
            _ => Err(ApiError::Server {
                code: 401,
                message: "wrong username or password".to_string(),
            }),
        }
    }

    async fn logout(&self, token: &str) -> ApiResult<()> {
        self.authed("logout", token).map(|_| ())
    }

    async fn current_user(&self, token: &str) -> ApiResult<User> {
        Ok(self.authed("current_user", token)?.me())
    }

    async fn get_user(&self, token: &str, user_id: i64) -> ApiResult<User> {
        let s = self.authed("get_user", token)?;
        s.users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| Self::not_found("user"))
    }

    async fn list_users(&self, token: &str, page: u32, page_size: u32) -> ApiResult<Page<User>> {
        let s = self.authed("list_users", token)?;
        Ok(paginate(&s.users, page, page_size))
    }

    async fn user_stats(&self, token: &str, _user_id: i64) -> ApiResult<UserStats> {
        self.authed("user_stats", token)?;
        Ok(UserStats {
            following_count: 3,
            follower_count: 7,
            is_following: false,
        })
    }

    async fn follow(&self, token: &str, _user_id: i64) -> ApiResult<()> {
        self.authed("follow", token).map(|_| ())
    }

    async fn unfollow(&self, token: &str, _user_id: i64) -> ApiResult<()> {
        self.authed("unfollow", token).map(|_| ())
    }

    async fn following(
        &self,
        token: &str,
        _user_id: i64,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Page<User>> {
        self.authed("following", token)?;
        Ok(paginate::<User>(&[], page, page_size))
    }

    async fn followers(
        &self,
        token: &str,
        _user_id: i64,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Page<User>> {
        self.authed("followers", token)?;
        Ok(paginate::<User>(&[], page, page_size))
    }

    async fn checkin(&self, token: &str) -> ApiResult<CheckinResponse> {
        let mut s = self.authed("checkin", token)?;
        if s.checked_in {
            return Err(ApiError::Server {
                code: 400,
                message: "already checked in today".to_string(),
            });
        }
        s.checked_in = true;
        if let Some(me) = s.users.first_mut() {
            me.coins += 50;
            me.exp = Some(me.exp.unwrap_or(0) + 25);
        }
        Ok(CheckinResponse {
            reward: Some(50),
            reward_coins: Some(50),
            reward_exp: Some(25),
            total_coins: s.users.first().map(|u| u.coins),
            total_exp: s.users.first().and_then(|u| u.exp),
            user_level: None,
            check_time: "2026-01-01 08:00:00".to_string(),
        })
    }

    async fn checkin_status(&self, token: &str) -> ApiResult<CheckinStatus> {
        let s = self.authed("checkin_status", token)?;
        Ok(CheckinStatus {
            checked_in: s.checked_in,
            can_check: !s.checked_in,
            check_time: None,
            reward: None,
        })
    }

    async fn list_boards(&self, token: &str) -> ApiResult<Vec<Board>> {
        Ok(self.authed("list_boards", token)?.boards.clone())
    }

    async fn get_board(&self, token: &str, board_id: i64) -> ApiResult<Board> {
        let s = self.authed("get_board", token)?;
        s.boards
            .iter()
            .find(|b| b.id == board_id)
            .cloned()
            .ok_or_else(|| Self::not_found("board"))
    }

    async fn create_board(&self, token: &str, request: &CreateBoardRequest) -> ApiResult<Board> {
        let mut s = self.authed("create_board", token)?;
        let id = s.next_id();
        let mut board = Board::new(id, &request.name);
        board.description.clone_from(&request.description);
        s.boards.push(board.clone());
        Ok(board)
    }

    async fn create_post(
        &self,
        token: &str,
        request: &CreatePostRequest,
    ) -> ApiResult<CreatedPost> {
        let mut s = self.authed("create_post", token)?;
        let id = s.next_id();
        let mut post = Post::new(id, request.board_id, &request.title);
        post.content.clone_from(&request.content);
        post.image_url.clone_from(&request.image_url);
        s.posts.push(post);
        Ok(CreatedPost { post_id: id })
    }

    async fn list_posts(&self, token: &str, query: &PostQuery) -> ApiResult<Page<Post>> {
        let s = self.authed("list_posts", token)?;
        let mut posts: Vec<Post> = s
            .posts
            .iter()
            .filter(|p| query.board_id.is_none_or(|b| p.board_id == b))
            .cloned()
            .map(|mut p| {
                p.is_liked = Some(s.liked_posts.contains(&p.id));
                p
            })
            .collect();
        match query.sort {
            PostSort::Latest => posts.sort_by(|a, b| b.id.cmp(&a.id)),
            PostSort::Hot => posts.sort_by(|a, b| b.likes.cmp(&a.likes)),
            PostSort::Reply => posts.sort_by(|a, b| b.comment_count.cmp(&a.comment_count)),
        }
        if s.ignore_page_size {
            return Ok(paginate(&posts, 1, posts.len() as u32));
        }
        Ok(paginate(&posts, query.page, query.page_size))
    }

    async fn get_post(&self, token: &str, post_id: i64) -> ApiResult<Post> {
        let s = self.authed("get_post", token)?;
        let mut post = s
            .posts
            .iter()
            .find(|p| p.id == post_id)
            .cloned()
            .ok_or_else(|| Self::not_found("post"))?;
        post.is_liked = Some(s.liked_posts.contains(&post_id));
        Ok(post)
    }

    async fn update_post(
        &self,
        token: &str,
        post_id: i64,
        request: &CreatePostRequest,
    ) -> ApiResult<()> {
        let mut s = self.authed("update_post", token)?;
        let post = s
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| Self::not_found("post"))?;
        post.board_id = request.board_id;
        post.title.clone_from(&request.title);
        post.content.clone_from(&request.content);
        post.image_url.clone_from(&request.image_url);
        Ok(())
    }

    async fn delete_post(&self, token: &str, post_id: i64) -> ApiResult<()> {
        let mut s = self.authed("delete_post", token)?;
        let before = s.posts.len();
        s.posts.retain(|p| p.id != post_id);
        if s.posts.len() == before {
            return Err(Self::not_found("post"));
        }
        Ok(())
    }

    async fn like_post(&self, token: &str, post_id: i64) -> ApiResult<LikeResult> {
        let mut s = self.authed("like_post", token)?;
        let now_liked = !s.liked_posts.contains(&post_id);
        let post = s
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| Self::not_found("post"))?;
        post.likes += if now_liked { 1 } else { -1 };
        let likes = post.likes;
        if now_liked {
            s.liked_posts.insert(post_id);
        } else {
            s.liked_posts.remove(&post_id);
        }
        Ok(LikeResult {
            likes,
            is_liked: now_liked,
        })
    }

    async fn unlike_post(&self, token: &str, post_id: i64) -> ApiResult<()> {
        let mut s = self.authed("unlike_post", token)?;
        if s.liked_posts.remove(&post_id)
            && let Some(post) = s.posts.iter_mut().find(|p| p.id == post_id)
        {
            post.likes -= 1;
        }
        Ok(())
    }

    async fn favorite_post(&self, token: &str, post_id: i64) -> ApiResult<()> {
        let mut s = self.authed("favorite_post", token)?;
        let post = s
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| Self::not_found("post"))?;
        post.favorites += 1;
        Ok(())
    }

    async fn coin_post(&self, token: &str, post_id: i64, amount: u8) -> ApiResult<CoinResult> {
        let mut s = self.authed("coin_post", token)?;
        let report = s.report_coins;
        let post = s
            .posts
            .iter_mut()
            .find(|p| p.id == post_id)
            .ok_or_else(|| Self::not_found("post"))?;
        post.coins += i64::from(amount);
        Ok(CoinResult {
            coins: report.then_some(post.coins),
        })
    }

    async fn create_comment(
        &self,
        token: &str,
        request: &CreateCommentRequest,
    ) -> ApiResult<Comment> {
        let mut s = self.authed("create_comment", token)?;
        let id = s.next_id();
        let mut comment = Comment::new(id, request.post_id, &request.content);
        comment.parent_id = request.parent_id;
        comment.user_id = 1;
        s.comments.push(comment.clone());
        if let Some(post) = s.posts.iter_mut().find(|p| p.id == request.post_id) {
            post.comment_count += 1;
        }
        Ok(comment)
    }

    async fn list_comments(
        &self,
        token: &str,
        post_id: i64,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Page<Comment>> {
        let s = self.authed("list_comments", token)?;
        let top: Vec<Comment> = s
            .comments
            .iter()
            .filter(|c| c.post_id == post_id && c.parent_id.is_none())
            .cloned()
            .collect();
        Ok(paginate(&top, page, page_size))
    }

    async fn update_comment(&self, token: &str, comment_id: i64, content: &str) -> ApiResult<()> {
        let mut s = self.authed("update_comment", token)?;
        let comment = s
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| Self::not_found("comment"))?;
        comment.content = Some(content.to_string());
        Ok(())
    }

    async fn delete_comment(&self, token: &str, comment_id: i64) -> ApiResult<()> {
        let mut s = self.authed("delete_comment", token)?;
        s.comments
            .retain(|c| c.id != comment_id && c.parent_id != Some(comment_id));
        Ok(())
    }

    async fn like_comment(&self, token: &str, comment_id: i64) -> ApiResult<LikeResult> {
        let mut s = self.authed("like_comment", token)?;
        let now_liked = !s.liked_comments.contains(&comment_id);
        let comment = s
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| Self::not_found("comment"))?;
        let likes = comment.likes.unwrap_or(0) + if now_liked { 1 } else { -1 };
        comment.likes = Some(likes);
        if now_liked {
            s.liked_comments.insert(comment_id);
        } else {
            s.liked_comments.remove(&comment_id);
        }
        Ok(LikeResult {
            likes,
            is_liked: now_liked,
        })
    }

    async fn coin_comment(
        &self,
        token: &str,
        comment_id: i64,
        amount: u8,
    ) -> ApiResult<CoinResult> {
        let mut s = self.authed("coin_comment", token)?;
        let report = s.report_coins;
        let comment = s
            .comments
            .iter_mut()
            .find(|c| c.id == comment_id)
            .ok_or_else(|| Self::not_found("comment"))?;
        let coins = comment.coins.unwrap_or(0) + i64::from(amount);
        comment.coins = Some(coins);
        Ok(CoinResult {
            coins: report.then_some(coins),
        })
    }

    async fn comment_replies(
        &self,
        token: &str,
        comment_id: i64,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Page<Comment>> {
        let s = self.authed("comment_replies", token)?;
        let replies: Vec<Comment> = s
            .comments
            .iter()
            .filter(|c| c.parent_id == Some(comment_id))
            .cloned()
            .collect();
        Ok(paginate(&replies, page, page_size))
    }

    async fn create_folder(
        &self,
        token: &str,
        request: &CreateFolderRequest,
    ) -> ApiResult<CreatedFolder> {
        let mut s = self.authed("create_folder", token)?;
        let id = s.next_id();
        s.folders.push(Folder {
            id,
            user_id: 1,
            name: request.name.clone(),
            description: request.description.clone(),
            is_public: request.is_public,
            item_count: 0,
            created_at: None,
            updated_at: None,
        });
        Ok(CreatedFolder { folder_id: id })
    }

    async fn my_folders(&self, token: &str) -> ApiResult<Vec<Folder>> {
        Ok(self.authed("my_folders", token)?.folders.clone())
    }

    async fn add_to_folder(&self, token: &str, folder_id: i64, post_id: i64) -> ApiResult<()> {
        let mut s = self.authed("add_to_folder", token)?;
        if !s.folders.iter().any(|f| f.id == folder_id) {
            return Err(Self::not_found("folder"));
        }
        if s.folder_posts.contains(&(folder_id, post_id)) {
            return Err(ApiError::Server {
                code: 400,
                message: "already in folder".to_string(),
            });
        }
        s.folder_posts.push((folder_id, post_id));
        if let Some(folder) = s.folders.iter_mut().find(|f| f.id == folder_id) {
            folder.item_count += 1;
        }
        if let Some(post) = s.posts.iter_mut().find(|p| p.id == post_id) {
            post.favorites += 1;
        }
        Ok(())
    }

    async fn list_apps(&self, query: &AppQuery) -> ApiResult<Page<App>> {
        self.enter("list_apps")?;
        let s = lock(&self.state);
        let apps: Vec<App> = s
            .apps
            .iter()
            .filter(|a| {
                query.category.is_none() || a.main_category.as_deref() == query.category.as_deref()
            })
            .map(app_summary)
            .collect();
        Ok(paginate(&apps, query.page, query.page_size))
    }

    async fn app_categories(&self) -> ApiResult<Vec<String>> {
        self.enter("app_categories")?;
        Ok(lock(&self.state).categories.clone())
    }

    async fn app_sub_categories(&self, _main_category: &str) -> ApiResult<SubCategories> {
        self.enter("app_sub_categories")?;
        Ok(SubCategories::default())
    }

    async fn app_detail(&self, package_name: &str) -> ApiResult<AppDetail> {
        self.enter("app_detail")?;
        lock(&self.state)
            .apps
            .iter()
            .find(|a| a.package_name == package_name)
            .cloned()
            .ok_or_else(|| Self::not_found("app"))
    }

    async fn coin_app(&self, token: &str, package_name: &str, coins: u32) -> ApiResult<()> {
        let mut s = self.authed("coin_app", token)?;
        let app = s
            .apps
            .iter_mut()
            .find(|a| a.package_name == package_name)
            .ok_or_else(|| Self::not_found("app"))?;
        app.total_coins += i64::from(coins);
        Ok(())
    }

    async fn record_download(&self, package_name: &str) -> ApiResult<()> {
        self.enter("record_download")?;
        if let Some(app) = lock(&self.state)
            .apps
            .iter_mut()
            .find(|a| a.package_name == package_name)
        {
            app.download_count += 1;
        }
        Ok(())
    }

    async fn upload_app(&self, token: &str, request: &UploadAppRequest) -> ApiResult<()> {
        let mut s = self.authed("upload_app", token)?;
        s.apps.push(app_detail(
            &request.package_name,
            &request.name,
            &request.main_category,
        ));
        Ok(())
    }
}
