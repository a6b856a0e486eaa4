//! # Tranx
//!
//! Client library for the Tranx community forum, with a small command-line
//! front end.
//!
//! ## Overview
//!
//! Tranx talks to a self-hosted community server (boards, posts, comments,
//! folders, daily check-in and an app market) and to a third-party image host
//! for post attachments. Screens are modelled as view-models that expose
//! observable state and turn user intents into API calls.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       View-models                           │
//! │  Home · Boards · Post detail · Login · Profile · Apps · ... │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │     Session     │ │       API       │ │  Image upload   │
//! │                 │ │                 │ │                 │
//! │ • Token         │ │ • REST client   │ │ • Direct        │
//! │ • Logout        │ │ • Provider      │ │ • Token exchange│
//! │ • Config        │ │ • Envelopes     │ │                 │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//!          │                   │                   │
//!          └───────────────────┴───────────────────┘
//!                              │
//!          ┌───────────────────┼───────────────────┐
//!          ▼                   ▼                   ▼
//! ┌─────────────────┐ ┌─────────────────┐ ┌─────────────────┐
//! │   Preferences   │ │     Config      │ │     Models      │
//! │                 │ │                 │ │                 │
//! │ • Server URL    │ │ • Timeouts      │ │ • Post, Comment │
//! │ • Theme         │ │ • Page sizes    │ │ • User, Board   │
//! │ • Encrypted     │ │ • Upload mode   │ │ • App           │
//! │   credentials   │ │                 │ │                 │
//! └─────────────────┘ └─────────────────┘ └─────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Community REST client, client provider and image host
//! - [`config`] - Configuration file and server-address helpers
//! - [`error`] - Error types for the API and uploader
//! - [`models`] - Data models mirrored from the server's JSON
//! - [`prefs`] - Persistent preferences and encrypted credentials
//! - [`theme`] - Theme mode and primary colour preferences
//! - [`viewmodel`] - Per-screen state and actions
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tranx::{ClientProvider, Config, HomeViewModel, PreferencesStore, Session};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let prefs = Arc::new(PreferencesStore::open_default()?);
//! let provider = Arc::new(ClientProvider::http(&config));
//! let session = Session::new(provider, prefs, config);
//!
//! let home = HomeViewModel::new(session);
//! home.load().await;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/tranx/0.1.0")]
#![warn(rustdoc::missing_crate_level_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::single_match_else)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::use_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::redundant_pub_crate)]
#![allow(clippy::return_self_not_must_use)]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod paths;
pub mod prefs;
pub mod theme;
pub mod viewmodel;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use api::image_host::{ImageUploader, PicuiClient};
pub use api::{ClientProvider, CommunityApi, HttpApiClient};
pub use config::{Config, UploadMode};
pub use error::{ApiError, ApiResult, UploadError};
pub use models::{App, AppDetail, Board, Comment, Post, User};
pub use prefs::PreferencesStore;
pub use theme::{PrimaryColor, ThemeMode};
pub use viewmodel::{
    AppDetailViewModel, AppListViewModel, BoardDetailViewModel, BoardListViewModel,
    ComposeViewModel, HomeViewModel, LoginViewModel, PostDetailViewModel, ProfileViewModel,
    Session, UiState,
};

/// ASCII logo for the application
pub const LOGO: &str = r"
  _______
 |_   _| _ __ _ _ _ __ __
   | || '_/ _` | ' \\ \ /
   |_||_| \__,_|_||_/_\_\
";

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
