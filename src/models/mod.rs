//! Data models mirrored from the community server's JSON

mod app;
mod board;
mod checkin;
mod comment;
mod envelope;
mod post;
mod user;

pub use app::{
    App, AppCoinRequest, AppDetail, AppSort, SubCategories, UploadAppRequest, channel_name,
    format_download_count, format_file_size,
};
pub use board::{
    AddToFolderRequest, Board, CreateBoardRequest, CreateFolderRequest, CreatedFolder, Folder,
};
pub use checkin::{CheckinResponse, CheckinStatus};
pub use comment::{Comment, CreateCommentRequest, UpdateCommentRequest};
pub use envelope::{CODE_OK, Envelope, Page};
pub use post::{
    CoinRequest, CoinResult, CreatePostRequest, CreatedPost, LikeResult, MAX_COIN_AMOUNT,
    MIN_COIN_AMOUNT, Post, PostSort,
};
pub use user::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, User, UserEnvelope, UserStats,
    level_progress,
};
