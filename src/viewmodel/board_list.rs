//! Board directory

use crate::error::{ApiError, ApiResult};
use crate::models::{Board, CreateBoardRequest};

use super::Session;
use super::state::{Action, PendingActions, StateCell, UiState};

/// Board list view-model
#[derive(Debug, Clone)]
pub struct BoardListViewModel {
    session: Session,
    state: StateCell<UiState<Vec<Board>>>,
    pending: PendingActions,
}

impl BoardListViewModel {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            state: StateCell::new(UiState::Loading),
            pending: PendingActions::default(),
        }
    }

    pub fn state(&self) -> UiState<Vec<Board>> {
        self.state.get()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<UiState<Vec<Board>>> {
        self.state.subscribe()
    }

    pub fn pending(&self) -> &PendingActions {
        &self.pending
    }

    pub async fn load(&self) {
        self.state.set(UiState::Loading);
        let result = async {
            let token = self.session.require_token()?;
            self.session.api()?.list_boards(&token).await
        }
        .await;
        match result {
            Ok(boards) => self.state.set(UiState::Success(boards)),
            Err(e) => {
                tracing::warn!("Failed to load boards: {}", e);
                self.state.set(UiState::Error(e.user_message()));
            }
        }
    }

    /// Create a board, then reload the list
    pub async fn create_board(&self, name: &str, description: Option<&str>) -> ApiResult<Board> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::invalid("board name must not be empty"));
        }
        let board = {
            let _guard = self.pending.begin(Action::CreateBoard);
            let token = self.session.require_token()?;
            let request = CreateBoardRequest {
                name: name.to_string(),
                description: description
                    .map(str::trim)
                    .filter(|d| !d.is_empty())
                    .map(str::to_string),
                avatar: None,
            };
            self.session.api()?.create_board(&token, &request).await?
        };
        tracing::info!("Created board {} ({})", board.name, board.id);
        self.load().await;
        Ok(board)
    }
}
