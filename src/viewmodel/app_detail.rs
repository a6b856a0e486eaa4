//! Single app in the market

use crate::error::{ApiError, ApiResult};
use crate::models::AppDetail;

use super::Session;
use super::state::{Action, PendingActions, StateCell, UiState};

/// App detail view-model
#[derive(Debug, Clone)]
pub struct AppDetailViewModel {
    session: Session,
    package_name: String,
    state: StateCell<UiState<AppDetail>>,
    pending: PendingActions,
}

impl AppDetailViewModel {
    pub fn new(session: Session, package_name: impl Into<String>) -> Self {
        Self {
            session,
            package_name: package_name.into(),
            state: StateCell::new(UiState::Loading),
            pending: PendingActions::default(),
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn state(&self) -> UiState<AppDetail> {
        self.state.get()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<UiState<AppDetail>> {
        self.state.subscribe()
    }

    pub fn pending(&self) -> &PendingActions {
        &self.pending
    }

    pub async fn load(&self) {
        self.state.set(UiState::Loading);
        let result = async { self.session.api()?.app_detail(&self.package_name).await }.await;
        match result {
            Ok(detail) => self.state.set(UiState::Success(detail)),
            Err(e) => {
                tracing::warn!("Failed to load app {}: {}", self.package_name, e);
                self.state.set(UiState::Error(e.user_message()));
            }
        }
    }

    /// Tip the app's uploader, then reload
    pub async fn coin_app(&self, coins: u32) -> ApiResult<()> {
        if coins == 0 {
            return Err(ApiError::invalid("coin amount must be positive"));
        }
        {
            let _guard = self.pending.begin(Action::CoinApp(self.package_name.clone()));
            let token = self.session.require_token()?;
            self.session
                .api()?
                .coin_app(&token, &self.package_name, coins)
                .await?;
        }
        self.load().await;
        Ok(())
    }

    /// Count a download. Failures are only logged.
    pub async fn record_download(&self) {
        let result = async { self.session.api()?.record_download(&self.package_name).await }.await;
        if let Err(e) = result {
            tracing::debug!("Download not recorded for {}: {}", self.package_name, e);
        }
    }
}
