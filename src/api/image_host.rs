//! Image host client
//!
//! Images attached to posts are stored on a third-party host rather than on
//! the community server. Two flows are supported:
//!
//! - Direct: multipart upload authorized with the user's bearer token
//! - Token exchange: trade the bearer token for a single-use upload token,
//!   then upload with that token as a form field

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{Config, UploadMode};
use crate::error::UploadError;
use crate::prefs::PreferencesStore;

/// Lifetime requested for exchanged upload tokens (30 days, the host's maximum)
pub const UPLOAD_TOKEN_SECONDS: u64 = 2_592_000;

/// An image ready to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// Raw bytes
    pub bytes: Vec<u8>,
    /// MIME type, e.g. `image/png`
    pub mime_type: String,
    /// File name reported to the host
    pub file_name: String,
}

/// Body for `POST /images/tokens`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TokenRequest {
    /// Number of tokens to issue
    pub num: u32,
    /// Token lifetime in seconds
    pub seconds: u64,
}

/// Response to an upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    /// Whether the host accepted the file
    #[serde(default)]
    pub status: bool,
    /// Host message
    #[serde(default)]
    pub message: Option<String>,
    /// Stored image
    #[serde(default)]
    pub data: Option<UploadedImage>,
}

/// Stored image details
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadedImage {
    /// Image key on the host
    #[serde(default)]
    pub key: Option<String>,
    /// Links to the stored image
    #[serde(default)]
    pub links: Option<ImageLinks>,
}

/// Links to a stored image
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImageLinks {
    /// Public URL
    #[serde(default)]
    pub url: Option<String>,
    /// Thumbnail URL
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// Response to a token request
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    /// Whether tokens were issued
    #[serde(default)]
    pub status: bool,
    /// Host message
    #[serde(default)]
    pub message: Option<String>,
    /// Issued tokens
    #[serde(default)]
    pub data: Option<IssuedTokens>,
}

/// Tokens issued by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IssuedTokens {
    /// Tokens, oldest first
    #[serde(default)]
    pub tokens: Vec<IssuedToken>,
}

/// A single-use upload token
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssuedToken {
    /// Token value
    pub token: String,
    /// Expiry time
    #[serde(default)]
    pub expired_at: Option<String>,
}

/// Raw image-host endpoints
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// `POST /upload` with the file as multipart `file`
    async fn upload(
        &self,
        bearer: Option<String>,
        upload_token: Option<String>,
        image: ImageFile,
    ) -> Result<UploadResponse, UploadError>;

    /// `POST /images/tokens`
    async fn issue_tokens(
        &self,
        bearer: String,
        request: TokenRequest,
    ) -> Result<TokenResponse, UploadError>;
}

/// reqwest-backed image host client
#[derive(Debug, Clone)]
pub struct PicuiClient {
    http: Client,
    base_url: String,
}

impl PicuiClient {
    /// Create a client for the given API base URL
    pub fn new(base_url: &str) -> Result<Self, UploadError> {
        Ok(Self {
            http: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the configuration
    pub fn from_config(config: &Config) -> Result<Self, UploadError> {
        Self::new(&config.image_host_url)
    }

    async fn decode<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, UploadError> {
        let status = response.status();
        let body = response.text().await?;
        tracing::debug!("image host -> {}", status);
        tracing::trace!("{}", body);

        serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                tracing::warn!("Unreadable image host response: {}", e);
                UploadError::Rejected("upload failed".to_string())
            } else {
                UploadError::Rejected(format!("upload failed (HTTP {})", status.as_u16()))
            }
        })
    }
}

#[async_trait]
impl ImageHost for PicuiClient {
    async fn upload(
        &self,
        bearer: Option<String>,
        upload_token: Option<String>,
        image: ImageFile,
    ) -> Result<UploadResponse, UploadError> {
        tracing::debug!("POST /upload ({} bytes)", image.bytes.len());
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.mime_type)?;
        let mut form = Form::new().part("file", part);
        if let Some(token) = upload_token {
            form = form.text("token", token);
        }

        let mut request = self
            .http
            .post(format!("{}/upload", self.base_url))
            .header(ACCEPT, "application/json")
            .multipart(form);
        if let Some(bearer) = bearer {
            request = request.header(AUTHORIZATION, format!("Bearer {bearer}"));
        }

        Self::decode(request.send().await?).await
    }

    async fn issue_tokens(
        &self,
        bearer: String,
        request: TokenRequest,
    ) -> Result<TokenResponse, UploadError> {
        tracing::debug!("POST /images/tokens");
        let response = self
            .http
            .post(format!("{}/images/tokens", self.base_url))
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, format!("Bearer {bearer}"))
            .json(&request)
            .send()
            .await?;
        Self::decode(response).await
    }
}

/// Uploads images with the token from the preferences store
#[derive(Clone)]
pub struct ImageUploader {
    host: Arc<dyn ImageHost>,
    prefs: Arc<PreferencesStore>,
    mode: UploadMode,
}

impl ImageUploader {
    /// Uploader over any image host
    pub fn new(host: Arc<dyn ImageHost>, prefs: Arc<PreferencesStore>, mode: UploadMode) -> Self {
        Self { host, prefs, mode }
    }

    /// Flow in use
    pub const fn mode(&self) -> UploadMode {
        self.mode
    }

    /// Upload an image and return its public URL.
    ///
    /// An empty MIME type becomes `image/*` and an empty file name gets a
    /// timestamped default.
    pub async fn upload_image(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        file_name: &str,
    ) -> Result<String, UploadError> {
        let token = self
            .prefs
            .image_host_token()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(UploadError::TokenNotConfigured)?;

        let image = ImageFile {
            bytes,
            mime_type: if mime_type.trim().is_empty() {
                "image/*".to_string()
            } else {
                mime_type.to_string()
            },
            file_name: if file_name.trim().is_empty() {
                default_file_name()
            } else {
                file_name.to_string()
            },
        };

        let response = match self.mode {
            UploadMode::Direct => self.host.upload(Some(token), None, image).await?,
            UploadMode::TokenExchange => {
                let upload_token = self.exchange_token(token).await?;
                self.host.upload(None, Some(upload_token), image).await?
            }
        };

        if !response.status {
            return Err(UploadError::Rejected(
                response.message.unwrap_or_else(|| "upload failed".to_string()),
            ));
        }

        response
            .data
            .and_then(|d| d.links)
            .and_then(|l| l.url)
            .filter(|url| !url.is_empty())
            .ok_or(UploadError::MissingUrl)
    }

    async fn exchange_token(&self, bearer: String) -> Result<String, UploadError> {
        let request = TokenRequest {
            num: 1,
            seconds: UPLOAD_TOKEN_SECONDS,
        };
        let response = self.host.issue_tokens(bearer, request).await?;
        if !response.status {
            return Err(UploadError::Rejected(
                response
                    .message
                    .unwrap_or_else(|| "token request failed".to_string()),
            ));
        }
        response
            .data
            .and_then(|d| d.tokens.into_iter().next())
            .map(|t| t.token)
            .ok_or(UploadError::NoUploadToken)
    }
}

impl std::fmt::Debug for ImageUploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageUploader")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

fn default_file_name() -> String {
    format!("tranx_{}.jpg", chrono::Utc::now().timestamp_millis())
}
