//! HTTP client for the community REST API

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::{Config, is_plain_http};
use crate::error::{ApiError, ApiResult};
use crate::models::{
    AddToFolderRequest, App, AppCoinRequest, AppDetail, Board, CheckinResponse, CheckinStatus,
    CoinRequest, CoinResult, Comment, CreateBoardRequest, CreateCommentRequest,
    CreateFolderRequest, CreatePostRequest, CreatedFolder, CreatedPost, Envelope, Folder,
    LikeResult, LoginRequest, LoginResponse, Page, Post, RegisterRequest, RegisterResponse,
    SubCategories, UpdateCommentRequest, UploadAppRequest, User, UserEnvelope, UserStats,
};

use super::{AppQuery, CommunityApi, PostQuery};

/// Header carrying the session token
const TOKEN_HEADER: &str = "Token";

/// Longest body excerpt kept in an HTTP error
const MAX_ERROR_BODY: usize = 512;

/// Timeouts for the HTTP client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Per-read timeout on the response
    pub read_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ClientSettings {
    fn from(config: &Config) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            read_timeout: Duration::from_secs(config.read_timeout_secs),
        }
    }
}

/// Community API client over reqwest
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    http: Client,
    base_url: String,
}

impl HttpApiClient {
    /// Create a client for `base_url`.
    ///
    /// Plain `http://` servers are typically self-hosted test instances, so
    /// certificate checks are switched off for them. They stay on for
    /// `https://`.
    pub fn new(base_url: &str, settings: &ClientSettings) -> ApiResult<Self> {
        let mut builder = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .read_timeout(settings.read_timeout)
            .user_agent(concat!("tranx/", env!("CARGO_PKG_VERSION")));

        if is_plain_http(base_url) {
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        tracing::debug!("{} {}", method, path);
        let mut request = self.http.request(method, format!("{}{}", self.base_url, path));
        if !token.is_empty() {
            request = request.header(TOKEN_HEADER, token);
        }
        request
    }

    /// Send, retrying once if the connection could not be established
    async fn send_with_retry(&self, request: RequestBuilder) -> ApiResult<Response> {
        let retry = request.try_clone();
        match request.send().await {
            Ok(response) => Ok(response),
            Err(e) if e.is_connect() => {
                let Some(retry) = retry else {
                    return Err(e.into());
                };
                tracing::warn!("Connection failed, retrying once: {}", e);
                Ok(retry.send().await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn envelope<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> ApiResult<Envelope<T>> {
        let response = self.send_with_retry(request).await?;
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("-> {}", status);
        tracing::trace!("{}", body);

        match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(ApiError::Http {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> ApiResult<Envelope<T>> {
        self.envelope(self.request(Method::GET, path, token)).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, token: &str) -> ApiResult<Envelope<T>> {
        self.envelope(self.request(Method::POST, path, token)).await
    }

    async fn post_json<B, T>(&self, path: &str, token: &str, body: &B) -> ApiResult<Envelope<T>>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.envelope(self.request(Method::POST, path, token).json(body))
            .await
    }

    async fn put_json<B, T>(&self, path: &str, token: &str, body: &B) -> ApiResult<Envelope<T>>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        self.envelope(self.request(Method::PUT, path, token).json(body))
            .await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str, token: &str) -> ApiResult<Envelope<T>> {
        self.envelope(self.request(Method::DELETE, path, token)).await
    }
}

/// Payload type for endpoints whose data we ignore
type Ignored = serde_json::Value;

/// Build a `?k=v&...` query string, skipping absent values
fn query_string(pairs: &[(&str, Option<String>)]) -> String {
    let encoded: Vec<String> = pairs
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_ref()
                .map(|v| format!("{}={}", key, urlencoding::encode(v)))
        })
        .collect();
    if encoded.is_empty() {
        String::new()
    } else {
        format!("?{}", encoded.join("&"))
    }
}

fn paging(page: u32, page_size: u32) -> String {
    query_string(&[
        ("page", Some(page.to_string())),
        ("page_size", Some(page_size.to_string())),
    ])
}

#[async_trait]
impl CommunityApi for HttpApiClient {
    async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        self.post_json("/api/auth/register", "", request)
            .await?
            .into_data()
    }

    async fn login(&self, request: &LoginRequest) -> ApiResult<LoginResponse> {
        self.post_json("/api/auth/login", "", request)
            .await?
            .into_data()
    }

    async fn logout(&self, token: &str) -> ApiResult<()> {
        self.post::<Ignored>("/api/logout", token).await?.into_unit()
    }

    async fn current_user(&self, token: &str) -> ApiResult<User> {
        let envelope: Envelope<UserEnvelope> = self.get("/api/me", token).await?;
        Ok(envelope.into_data()?.user)
    }

    async fn get_user(&self, token: &str, user_id: i64) -> ApiResult<User> {
        let envelope: Envelope<UserEnvelope> =
            self.get(&format!("/api/users/{user_id}"), token).await?;
        Ok(envelope.into_data()?.user)
    }

    async fn list_users(&self, token: &str, page: u32, page_size: u32) -> ApiResult<Page<User>> {
        self.get(&format!("/api/users{}", paging(page, page_size)), token)
            .await?
            .into_data()
    }

    async fn user_stats(&self, token: &str, user_id: i64) -> ApiResult<UserStats> {
        self.get(&format!("/api/users/{user_id}/stats"), token)
            .await?
            .into_data()
    }

    async fn follow(&self, token: &str, user_id: i64) -> ApiResult<()> {
        self.post::<Ignored>(&format!("/api/follow/{user_id}"), token)
            .await?
            .into_unit()
    }

    async fn unfollow(&self, token: &str, user_id: i64) -> ApiResult<()> {
        self.delete::<Ignored>(&format!("/api/follow/{user_id}"), token)
            .await?
            .into_unit()
    }

    async fn following(
        &self,
        token: &str,
        user_id: i64,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Page<User>> {
        let path = format!("/api/follow/{user_id}/following{}", paging(page, page_size));
        self.get(&path, token).await?.into_data()
    }

    async fn followers(
        &self,
        token: &str,
        user_id: i64,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Page<User>> {
        let path = format!("/api/follow/{user_id}/followers{}", paging(page, page_size));
        self.get(&path, token).await?.into_data()
    }

    async fn checkin(&self, token: &str) -> ApiResult<CheckinResponse> {
        self.post("/api/checkin", token).await?.into_data()
    }

    async fn checkin_status(&self, token: &str) -> ApiResult<CheckinStatus> {
        self.get("/api/checkin/status", token).await?.into_data()
    }

    async fn list_boards(&self, token: &str) -> ApiResult<Vec<Board>> {
        Ok(self
            .get("/api/boards/list", token)
            .await?
            .into_optional()?
            .unwrap_or_default())
    }

    async fn get_board(&self, token: &str, board_id: i64) -> ApiResult<Board> {
        self.get(&format!("/api/boards/{board_id}"), token)
            .await?
            .into_data()
    }

    async fn create_board(&self, token: &str, request: &CreateBoardRequest) -> ApiResult<Board> {
        self.post_json("/api/boards/create", token, request)
            .await?
            .into_data()
    }

    async fn create_post(
        &self,
        token: &str,
        request: &CreatePostRequest,
    ) -> ApiResult<CreatedPost> {
        self.post_json("/api/posts/create", token, request)
            .await?
            .into_data()
    }

    async fn list_posts(&self, token: &str, query: &PostQuery) -> ApiResult<Page<Post>> {
        let qs = query_string(&[
            ("board_id", query.board_id.map(|id| id.to_string())),
            ("sort", Some(query.sort.as_str().to_string())),
            ("page", Some(query.page.to_string())),
            ("page_size", Some(query.page_size.to_string())),
        ]);
        self.get(&format!("/api/posts/list{qs}"), token)
            .await?
            .into_data()
    }

    async fn get_post(&self, token: &str, post_id: i64) -> ApiResult<Post> {
        self.get(&format!("/api/posts/{post_id}"), token)
            .await?
            .into_data()
    }

    async fn update_post(
        &self,
        token: &str,
        post_id: i64,
        request: &CreatePostRequest,
    ) -> ApiResult<()> {
        self.put_json::<_, Ignored>(&format!("/api/posts/{post_id}"), token, request)
            .await?
            .into_unit()
    }

    async fn delete_post(&self, token: &str, post_id: i64) -> ApiResult<()> {
        self.delete::<Ignored>(&format!("/api/posts/{post_id}"), token)
            .await?
            .into_unit()
    }

    async fn like_post(&self, token: &str, post_id: i64) -> ApiResult<LikeResult> {
        self.post(&format!("/api/posts/{post_id}/like"), token)
            .await?
            .into_data()
    }

    async fn unlike_post(&self, token: &str, post_id: i64) -> ApiResult<()> {
        self.delete::<Ignored>(&format!("/api/posts/{post_id}/like"), token)
            .await?
            .into_unit()
    }

    async fn favorite_post(&self, token: &str, post_id: i64) -> ApiResult<()> {
        self.post::<Ignored>(&format!("/api/posts/{post_id}/favorite"), token)
            .await?
            .into_unit()
    }

    async fn coin_post(&self, token: &str, post_id: i64, amount: u8) -> ApiResult<CoinResult> {
        let body = CoinRequest { amount };
        Ok(self
            .post_json(&format!("/api/posts/{post_id}/coin"), token, &body)
            .await?
            .into_optional()?
            .unwrap_or_default())
    }

    async fn create_comment(
        &self,
        token: &str,
        request: &CreateCommentRequest,
    ) -> ApiResult<Comment> {
        self.post_json("/api/comments/create", token, request)
            .await?
            .into_data()
    }

    async fn list_comments(
        &self,
        token: &str,
        post_id: i64,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Page<Comment>> {
        let qs = query_string(&[
            ("post_id", Some(post_id.to_string())),
            ("sort", Some("default".to_string())),
            ("page", Some(page.to_string())),
            ("page_size", Some(page_size.to_string())),
        ]);
        self.get(&format!("/api/comments/list{qs}"), token)
            .await?
            .into_data()
    }

    async fn update_comment(&self, token: &str, comment_id: i64, content: &str) -> ApiResult<()> {
        let body = UpdateCommentRequest {
            content: content.to_string(),
        };
        self.put_json::<_, Ignored>(&format!("/api/comments/{comment_id}"), token, &body)
            .await?
            .into_unit()
    }

    async fn delete_comment(&self, token: &str, comment_id: i64) -> ApiResult<()> {
        self.delete::<Ignored>(&format!("/api/comments/{comment_id}"), token)
            .await?
            .into_unit()
    }

    async fn like_comment(&self, token: &str, comment_id: i64) -> ApiResult<LikeResult> {
        self.post(&format!("/api/comments/{comment_id}/like"), token)
            .await?
            .into_data()
    }

    async fn coin_comment(
        &self,
        token: &str,
        comment_id: i64,
        amount: u8,
    ) -> ApiResult<CoinResult> {
        let body = CoinRequest { amount };
        Ok(self
            .post_json(&format!("/api/comments/{comment_id}/coin"), token, &body)
            .await?
            .into_optional()?
            .unwrap_or_default())
    }

    async fn comment_replies(
        &self,
        token: &str,
        comment_id: i64,
        page: u32,
        page_size: u32,
    ) -> ApiResult<Page<Comment>> {
        let path = format!("/api/comments/{comment_id}/replies{}", paging(page, page_size));
        self.get(&path, token).await?.into_data()
    }

    async fn create_folder(
        &self,
        token: &str,
        request: &CreateFolderRequest,
    ) -> ApiResult<CreatedFolder> {
        self.post_json("/api/folders/create", token, request)
            .await?
            .into_data()
    }

    async fn my_folders(&self, token: &str) -> ApiResult<Vec<Folder>> {
        Ok(self
            .get("/api/folders/my", token)
            .await?
            .into_optional()?
            .unwrap_or_default())
    }

    async fn add_to_folder(&self, token: &str, folder_id: i64, post_id: i64) -> ApiResult<()> {
        let body = AddToFolderRequest { post_id };
        self.post_json::<_, Ignored>(&format!("/api/folders/{folder_id}/posts"), token, &body)
            .await?
            .into_unit()
    }

    async fn list_apps(&self, query: &AppQuery) -> ApiResult<Page<App>> {
        let qs = query_string(&[
            ("category", query.category.clone()),
            ("sort", Some(query.sort.as_str().to_string())),
            ("page", Some(query.page.to_string())),
            ("page_size", Some(query.page_size.to_string())),
        ]);
        self.get(&format!("/api/apps/list{qs}"), "")
            .await?
            .into_data()
    }

    async fn app_categories(&self) -> ApiResult<Vec<String>> {
        Ok(self
            .get("/api/apps/categories", "")
            .await?
            .into_optional()?
            .unwrap_or_default())
    }

    async fn app_sub_categories(&self, main_category: &str) -> ApiResult<SubCategories> {
        let path = format!("/api/apps/categories/{}", urlencoding::encode(main_category));
        Ok(self.get(&path, "").await?.into_optional()?.unwrap_or_default())
    }

    async fn app_detail(&self, package_name: &str) -> ApiResult<AppDetail> {
        let path = format!("/api/apps/{}", urlencoding::encode(package_name));
        self.get(&path, "").await?.into_data()
    }

    async fn coin_app(&self, token: &str, package_name: &str, coins: u32) -> ApiResult<()> {
        let path = format!("/api/apps/{}/coin", urlencoding::encode(package_name));
        self.post_json::<_, Ignored>(&path, token, &AppCoinRequest { coins })
            .await?
            .into_unit()
    }

    async fn record_download(&self, package_name: &str) -> ApiResult<()> {
        let path = format!("/api/apps/{}/download", urlencoding::encode(package_name));
        self.post::<Ignored>(&path, "").await?.into_unit()
    }

    async fn upload_app(&self, token: &str, request: &UploadAppRequest) -> ApiResult<()> {
        self.post_json::<_, Ignored>("/api/apps/upload", token, request)
            .await?
            .into_unit()
    }
}
