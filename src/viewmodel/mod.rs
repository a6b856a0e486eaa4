//! View-models
//!
//! Each view-model owns observable state for one screen and turns user
//! intents into API calls. They are cheap to clone, so actions can be spawned
//! onto a [`ViewScope`] and abandoned when the screen goes away.
//!
//! Actions follow one policy: the request goes out first, and local state is
//! patched only after the server confirms, using the counters it returns.
//! Failures leave state untouched and come back as `Err`.

mod app_detail;
mod app_list;
mod board_detail;
mod board_list;
mod compose;
mod home;
mod login;
mod post_detail;
mod profile;
mod state;

pub use app_detail::AppDetailViewModel;
pub use app_list::{APP_PAGE_SIZE, AppListState, AppListViewModel};
pub use board_detail::{BoardDetailData, BoardDetailViewModel};
pub use board_list::BoardListViewModel;
pub use compose::{ComposeData, ComposeForm, ComposeViewModel};
pub use home::{HomeData, HomeViewModel};
pub use login::{LoginState, LoginViewModel};
pub use post_detail::{PostDetailData, PostDetailViewModel};
pub use profile::{ProfileData, ProfileViewModel};
pub use state::{Action, PendingActions, PendingGuard, StateCell, UiState, ViewScope};

use std::sync::Arc;

use crate::api::{ClientProvider, CommunityApi};
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    CreateFolderRequest, Folder, LikeResult, MAX_COIN_AMOUNT, MIN_COIN_AMOUNT, Page, Post,
};
use crate::prefs::PreferencesStore;

/// Everything a view-model needs from the outside world
#[derive(Debug, Clone)]
pub struct Session {
    provider: Arc<ClientProvider>,
    prefs: Arc<PreferencesStore>,
    config: Arc<Config>,
}

impl Session {
    /// Bundle the shared services
    pub fn new(provider: Arc<ClientProvider>, prefs: Arc<PreferencesStore>, config: Config) -> Self {
        Self {
            provider,
            prefs,
            config: Arc::new(config),
        }
    }

    /// API client for the configured server
    pub fn api(&self) -> ApiResult<Arc<dyn CommunityApi>> {
        self.provider.client(&self.prefs.server_url())
    }

    /// Session token, or an empty string when logged out
    pub fn token(&self) -> String {
        self.prefs.token().unwrap_or_default()
    }

    /// Session token; fails locally when logged out
    pub fn require_token(&self) -> ApiResult<String> {
        self.prefs
            .token()
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::NotLoggedIn)
    }

    /// Shared preferences store
    pub fn prefs(&self) -> &Arc<PreferencesStore> {
        &self.prefs
    }

    /// Shared client provider
    pub fn provider(&self) -> &Arc<ClientProvider> {
        &self.provider
    }

    /// Client configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Best-effort server logout, then wipe every stored preference.
    ///
    /// Local state is cleared whatever the server says.
    pub async fn logout(&self) -> ApiResult<()> {
        if let Some(token) = self.prefs.token() {
            match self.api() {
                Ok(api) => {
                    if let Err(e) = api.logout(&token).await {
                        tracing::warn!("Server logout failed: {}", e);
                    }
                }
                Err(e) => tracing::warn!("No client for logout: {}", e),
            }
        }
        self.prefs.clear_all()?;
        tracing::info!("Logged out");
        Ok(())
    }
}

/// Check a coin amount before anything is sent
pub fn validate_coin_amount(amount: u8) -> ApiResult<u8> {
    if (MIN_COIN_AMOUNT..=MAX_COIN_AMOUNT).contains(&amount) {
        Ok(amount)
    } else {
        Err(ApiError::invalid(format!(
            "coin amount must be between {MIN_COIN_AMOUNT} and {MAX_COIN_AMOUNT}"
        )))
    }
}

/// Posts to render from one page: at most `page_size`, in server order
fn capped_posts(page: Page<Post>, page_size: u32) -> Vec<Post> {
    let mut posts = page.list;
    posts.truncate(page_size as usize);
    posts
}

/// Apply `f` to the post with `post_id`, if present
fn patch_post(posts: &mut [Post], post_id: i64, f: impl FnOnce(&mut Post)) {
    if let Some(post) = posts.iter_mut().find(|p| p.id == post_id) {
        f(post);
    }
}

// Post actions shared by the list and detail screens. Each holds a pending
// mark for its duration and leaves patching to the caller.

async fn request_like(
    session: &Session,
    pending: &PendingActions,
    post_id: i64,
) -> ApiResult<LikeResult> {
    let _guard = pending.begin(Action::LikePost(post_id));
    let token = session.require_token()?;
    session.api()?.like_post(&token, post_id).await
}

async fn request_favorite(
    session: &Session,
    pending: &PendingActions,
    post_id: i64,
    folder_id: i64,
) -> ApiResult<()> {
    let _guard = pending.begin(Action::FavoritePost(post_id));
    let token = session.require_token()?;
    session.api()?.add_to_folder(&token, folder_id, post_id).await
}

/// Returns the post's coin total to display
async fn request_coin_post(
    session: &Session,
    pending: &PendingActions,
    post_id: i64,
    amount: u8,
) -> ApiResult<i64> {
    let amount = validate_coin_amount(amount)?;
    let _guard = pending.begin(Action::CoinPost(post_id));
    let token = session.require_token()?;
    let result = session.api()?.coin_post(&token, post_id, amount).await?;
    Ok(result.coins.unwrap_or_else(|| i64::from(amount)))
}

/// Folder list shared by screens that can save posts
async fn fetch_folders(session: &Session) -> ApiResult<Vec<Folder>> {
    let token = session.require_token()?;
    session.api()?.my_folders(&token).await
}

async fn request_create_folder(
    session: &Session,
    pending: &PendingActions,
    name: &str,
    description: Option<&str>,
    is_public: bool,
) -> ApiResult<i64> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::invalid("folder name must not be empty"));
    }
    let _guard = pending.begin(Action::CreateFolder);
    let token = session.require_token()?;
    let request = CreateFolderRequest {
        name: name.to_string(),
        description: description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        is_public,
    };
    Ok(session.api()?.create_folder(&token, &request).await?.folder_id)
}
