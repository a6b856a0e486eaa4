//! Profile, daily check-in and logout

use crate::error::ApiResult;
use crate::models::{CheckinResponse, CheckinStatus, User, UserStats};

use super::Session;
use super::state::{Action, PendingActions, StateCell, UiState};

/// Everything the profile screen shows
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileData {
    pub user: User,
    pub checkin: CheckinStatus,
    /// Follow counts, if they could be loaded
    pub stats: Option<UserStats>,
}

impl ProfileData {
    /// Level shown next to the name
    pub fn level(&self) -> i32 {
        self.user.display_level()
    }

    /// Progress bar value in `[0, 1]`
    pub fn level_progress(&self) -> f32 {
        self.user.level_progress()
    }
}

/// Profile view-model
#[derive(Debug, Clone)]
pub struct ProfileViewModel {
    session: Session,
    state: StateCell<UiState<ProfileData>>,
    pending: PendingActions,
}

impl ProfileViewModel {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            state: StateCell::new(UiState::Loading),
            pending: PendingActions::default(),
        }
    }

    pub fn state(&self) -> UiState<ProfileData> {
        self.state.get()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<UiState<ProfileData>> {
        self.state.subscribe()
    }

    pub fn pending(&self) -> &PendingActions {
        &self.pending
    }

    /// Fetch the current user (caching it locally), check-in status and
    /// follow stats. Only the user fetch has to succeed.
    pub async fn load(&self) {
        self.state.set(UiState::Loading);
        match self.fetch().await {
            Ok(data) => self.state.set(UiState::Success(data)),
            Err(e) => {
                tracing::warn!("Failed to load profile: {}", e);
                self.state.set(UiState::Error(e.user_message()));
            }
        }
    }

    async fn fetch(&self) -> ApiResult<ProfileData> {
        let token = self.session.require_token()?;
        let api = self.session.api()?;

        let user = api.current_user(&token).await?;
        if let Err(e) = self.session.prefs().set_user(&user) {
            tracing::warn!("Failed to cache user profile: {:#}", e);
        }

        let checkin = api.checkin_status(&token).await.unwrap_or_else(|e| {
            tracing::warn!("Failed to load check-in status: {}", e);
            CheckinStatus::default()
        });

        let stats = api
            .user_stats(&token, user.id)
            .await
            .inspect_err(|e| tracing::warn!("Failed to load follow stats: {}", e))
            .ok();

        Ok(ProfileData {
            user,
            checkin,
            stats,
        })
    }

    /// Daily check-in, then reload the profile
    pub async fn checkin(&self) -> ApiResult<CheckinResponse> {
        let response = {
            let _guard = self.pending.begin(Action::Checkin);
            let token = self.session.require_token()?;
            self.session.api()?.checkin(&token).await?
        };
        tracing::info!("Checked in: {}", response.summary());
        self.load().await;
        Ok(response)
    }

    /// Log out and wipe local data
    pub async fn logout(&self) -> ApiResult<()> {
        let _guard = self.pending.begin(Action::Logout);
        self.session.logout().await
    }
}
