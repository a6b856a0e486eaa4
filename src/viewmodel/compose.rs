//! Writing and editing posts

use crate::api::image_host::ImageUploader;
use crate::error::{ApiError, ApiResult, UploadError};
use crate::models::{Board, CreatePostRequest};

use super::Session;
use super::state::{Action, PendingActions, StateCell, UiState};

/// Fields of the post being written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeForm {
    pub board_id: Option<i64>,
    pub title: String,
    pub content: String,
    /// URL of the attached image on the image host
    pub image_url: Option<String>,
}

impl ComposeForm {
    fn to_request(&self) -> ApiResult<CreatePostRequest> {
        let board_id = self
            .board_id
            .ok_or_else(|| ApiError::invalid("please choose a board"))?;
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ApiError::invalid("title must not be empty"));
        }
        let content = self.content.trim();
        if content.is_empty() {
            return Err(ApiError::invalid("content must not be empty"));
        }
        Ok(CreatePostRequest {
            board_id,
            title: title.to_string(),
            content: content.to_string(),
            image_url: self.image_url.clone(),
        })
    }
}

/// Loaded context for the compose screen
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeData {
    pub boards: Vec<Board>,
    /// Post being edited, `None` for a new post
    pub editing: Option<i64>,
}

/// Compose view-model
#[derive(Debug, Clone)]
pub struct ComposeViewModel {
    session: Session,
    uploader: ImageUploader,
    editing: Option<i64>,
    state: StateCell<UiState<ComposeData>>,
    form: StateCell<ComposeForm>,
    pending: PendingActions,
}

impl ComposeViewModel {
    /// Compose a new post, or edit `editing` when set
    pub fn new(session: Session, uploader: ImageUploader, editing: Option<i64>) -> Self {
        Self {
            session,
            uploader,
            editing,
            state: StateCell::new(UiState::Loading),
            form: StateCell::new(ComposeForm::default()),
            pending: PendingActions::default(),
        }
    }

    pub fn state(&self) -> UiState<ComposeData> {
        self.state.get()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<UiState<ComposeData>> {
        self.state.subscribe()
    }

    pub fn form(&self) -> ComposeForm {
        self.form.get()
    }

    pub fn pending(&self) -> &PendingActions {
        &self.pending
    }

    /// Fetch the boards, and the post being edited if any
    pub async fn load(&self) {
        self.state.set(UiState::Loading);
        match self.fetch().await {
            Ok(data) => self.state.set(UiState::Success(data)),
            Err(e) => {
                tracing::warn!("Failed to prepare compose screen: {}", e);
                self.state.set(UiState::Error(e.user_message()));
            }
        }
    }

    async fn fetch(&self) -> ApiResult<ComposeData> {
        let token = self.session.require_token()?;
        let api = self.session.api()?;
        let boards = api.list_boards(&token).await?;

        if let Some(post_id) = self.editing {
            let post = api.get_post(&token, post_id).await?;
            self.form.set(ComposeForm {
                board_id: Some(post.board_id),
                title: post.title,
                content: post.content,
                image_url: post.image_url,
            });
        }

        Ok(ComposeData {
            boards,
            editing: self.editing,
        })
    }

    pub fn set_board(&self, board_id: i64) {
        self.form.update(|f| f.board_id = Some(board_id));
    }

    pub fn set_title(&self, title: &str) {
        self.form.update(|f| f.title = title.to_string());
    }

    pub fn set_content(&self, content: &str) {
        self.form.update(|f| f.content = content.to_string());
    }

    /// Upload an image and attach its URL to the post
    pub async fn attach_image(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        file_name: &str,
    ) -> Result<String, UploadError> {
        let url = {
            let _guard = self.pending.begin(Action::UploadImage);
            self.uploader
                .upload_image(bytes, mime_type, file_name)
                .await?
        };
        tracing::info!("Attached image {}", url);
        self.form.update(|f| f.image_url = Some(url.clone()));
        Ok(url)
    }

    pub fn clear_image(&self) {
        self.form.update(|f| f.image_url = None);
    }

    /// Create the post (or save the edit); returns its ID.
    ///
    /// A new post clears the form afterwards, keeping the chosen board.
    pub async fn submit(&self) -> ApiResult<i64> {
        let request = self.form.with(ComposeForm::to_request)?;
        let _guard = self.pending.begin(Action::SubmitPost);
        let token = self.session.require_token()?;
        let api = self.session.api()?;

        match self.editing {
            Some(post_id) => {
                api.update_post(&token, post_id, &request).await?;
                tracing::info!("Updated post {}", post_id);
                Ok(post_id)
            }
            None => {
                let created = api.create_post(&token, &request).await?;
                tracing::info!("Created post {}", created.post_id);
                self.form.set(ComposeForm {
                    board_id: Some(request.board_id),
                    ..ComposeForm::default()
                });
                Ok(created.post_id)
            }
        }
    }
}
