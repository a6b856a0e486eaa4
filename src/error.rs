//! Error types for the API and image-upload layers

use thiserror::Error;

/// Everything that can go wrong talking to the community server.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection, DNS, TLS or timeout failure
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body was not the JSON shape we expected
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Non-200 HTTP status without a decodable envelope
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Raw response body (possibly truncated)
        body: String,
    },

    /// The envelope reported `code != 200`
    #[error("{message}")]
    Server {
        /// Envelope code
        code: i64,
        /// Server-provided message, shown verbatim
        message: String,
    },

    /// A success envelope came back without the payload we need
    #[error("server returned no data")]
    MissingData,

    /// No session token is stored
    #[error("not logged in")]
    NotLoggedIn,

    /// A local check failed before any request was made
    #[error("{0}")]
    Invalid(String),

    /// Preference storage failed
    #[error("storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Shorthand for a local validation failure
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Whether re-running the same request may succeed
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Http { .. })
    }

    /// Whether the failure happened before anything was sent
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::NotLoggedIn | Self::Invalid(_) | Self::Storage(_))
    }

    /// Message suitable for showing to the user.
    ///
    /// Server messages pass through verbatim; transport problems collapse to a
    /// generic message with a retry hint.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(e) if e.is_timeout() => {
                "Request timed out, please try again".to_string()
            }
            Self::Transport(_) => "Network error, please try again".to_string(),
            Self::Http { status, .. } => format!("Server error ({status}), please try again"),
            Self::Decode(_) => "Unexpected response from server".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result alias for API operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::Storage(format!("{e:#}"))
    }
}

/// Failures of the image-host upload flow
#[derive(Error, Debug)]
pub enum UploadError {
    /// No image-host token has been configured
    #[error("image host token not configured")]
    TokenNotConfigured,

    /// Transport failure
    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The host answered with `status: false` or an HTTP error
    #[error("{0}")]
    Rejected(String),

    /// The token-exchange step produced no token
    #[error("image host issued no upload token")]
    NoUploadToken,

    /// The host accepted the file but did not tell us where it lives
    #[error("uploaded but no URL returned")]
    MissingUrl,
}
