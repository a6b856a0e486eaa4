//! Login, registration and server selection

use crate::error::{ApiError, ApiResult};
use crate::models::{LoginRequest, RegisterRequest};

use super::Session;
use super::state::StateCell;

const MIN_USERNAME_CHARS: usize = 3;
const MAX_USERNAME_CHARS: usize = 20;
const MIN_PASSWORD_CHARS: usize = 8;

/// Login screen state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoginState {
    #[default]
    Idle,
    Loading,
    Success(String),
    Error(String),
}

/// Login view-model
#[derive(Debug, Clone)]
pub struct LoginViewModel {
    session: Session,
    state: StateCell<LoginState>,
    server_url: StateCell<String>,
}

impl LoginViewModel {
    pub fn new(session: Session) -> Self {
        let server_url = session.prefs().server_url();
        Self {
            session,
            state: StateCell::new(LoginState::Idle),
            server_url: StateCell::new(server_url),
        }
    }

    pub fn state(&self) -> LoginState {
        self.state.get()
    }

    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<LoginState> {
        self.state.subscribe()
    }

    /// Server address shown in the settings field
    pub fn server_url(&self) -> String {
        self.server_url.get()
    }

    /// Log in and store the session token and user
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<()> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(self.fail(ApiError::invalid("username and password are required")));
        }

        self.state.set(LoginState::Loading);
        let result = async {
            let request = LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            };
            let response = self.session.api()?.login(&request).await?;
            self.session.prefs().set_token(&response.token)?;
            self.session.prefs().set_user(&response.user)?;
            Ok::<_, ApiError>(response.user)
        }
        .await;

        match result {
            Ok(user) => {
                tracing::info!("Logged in as {}", user.username);
                self.state.set(LoginState::Success("Logged in".to_string()));
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Create an account. The user still has to log in afterwards.
    pub async fn register(&self, username: &str, password: &str, confirm: &str) -> ApiResult<()> {
        let username = username.trim();
        if let Err(e) = validate_registration(username, password, confirm) {
            return Err(self.fail(e));
        }

        self.state.set(LoginState::Loading);
        let request = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: None,
            avatar: None,
        };
        let result = async { self.session.api()?.register(&request).await }.await;

        match result {
            Ok(response) => {
                tracing::info!("Registered user {} ({})", response.username, response.user_id);
                self.state
                    .set(LoginState::Success("Registered, please log in".to_string()));
                Ok(())
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Normalize and persist a new server address, then point the client at it
    pub fn update_server_url(&self, url: &str) -> ApiResult<String> {
        if url.trim().is_empty() {
            return Err(ApiError::invalid("server address must not be empty"));
        }
        let url = self.session.prefs().set_server_url(url)?;
        self.session.provider().client(&url)?;
        tracing::info!("Server set to {}", url);
        self.server_url.set(url.clone());
        Ok(url)
    }

    /// Back to `Idle`
    pub fn reset(&self) {
        self.state.set(LoginState::Idle);
    }

    fn fail(&self, error: ApiError) -> ApiError {
        tracing::warn!("Login screen action failed: {}", error);
        self.state.set(LoginState::Error(error.user_message()));
        error
    }
}

fn validate_registration(username: &str, password: &str, confirm: &str) -> ApiResult<()> {
    if username.is_empty() || password.is_empty() {
        return Err(ApiError::invalid("username and password are required"));
    }
    let len = username.chars().count();
    if !(MIN_USERNAME_CHARS..=MAX_USERNAME_CHARS).contains(&len) {
        return Err(ApiError::invalid(format!(
            "username must be {MIN_USERNAME_CHARS}-{MAX_USERNAME_CHARS} characters"
        )));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::invalid(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }
    if password != confirm {
        return Err(ApiError::invalid("passwords do not match"));
    }
    Ok(())
}
