//! User model and level progress

use serde::{Deserialize, Serialize};

/// A community member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-side ID
    pub id: i64,
    /// Login name
    pub username: String,
    /// Email address, if the user shared one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Legacy level field
    #[serde(default)]
    pub level: i32,
    /// Level computed by the server (preferred when present)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_level: Option<i32>,
    /// Experience points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
    /// Coin balance (never negative)
    #[serde(default)]
    pub coins: i64,
    /// Avatar URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Registration time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Last profile update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl User {
    /// Create a user with only the required fields set
    pub fn new(id: i64, username: &str) -> Self {
        Self {
            id,
            username: username.to_string(),
            email: None,
            level: 0,
            user_level: None,
            exp: None,
            coins: 0,
            avatar: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Level to display: `user_level` when the server sent it, otherwise `level`
    pub fn display_level(&self) -> i32 {
        self.user_level.unwrap_or(self.level)
    }

    /// Progress through the current level, in `[0, 1]`
    pub fn level_progress(&self) -> f32 {
        level_progress(self.exp.unwrap_or(0), self.display_level())
    }

    /// Coin balance, clamped at zero
    pub fn coin_balance(&self) -> i64 {
        self.coins.max(0)
    }
}

/// Progress through `level` given total `exp`, clamped to `[0, 1]`.
///
/// Returns 0 when the level has an empty experience range.
///
/// Any `exp` and `level` are accepted, including the extremes.
pub fn level_progress(exp: i64, level: i32) -> f32 {
    let level = f64::from(level);
    let current = (level - 1.0).powi(2) * 100.0;
    let next = level.powi(2) * 100.0;
    let range = next - current;
    if range <= 0.0 {
        return 0.0;
    }
    ((exp as f64 - current) / range).clamp(0.0, 1.0) as f32
}

/// Follow statistics for a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserStats {
    /// How many users this user follows
    pub following_count: i64,
    /// How many users follow this user
    pub follower_count: i64,
    /// Whether the current user follows this user
    #[serde(default)]
    pub is_following: bool,
}

/// Payload of `/api/me` and `/api/users/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct UserEnvelope {
    /// The user record
    pub user: User,
}

/// Login request body
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    /// Login name
    pub username: String,
    /// Password
    pub password: String,
}

/// Registration request body
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    /// Desired login name
    pub username: String,
    /// Password
    pub password: String,
    /// Optional email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Optional avatar URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Successful login payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Session token to send in the `Token` header
    pub token: String,
    /// The logged-in user
    pub user: User,
    /// Server-side session expiry (informational)
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Successful registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    /// New user ID
    pub user_id: i64,
    /// Registered name
    pub username: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_progress_midway() {
        let p = level_progress(150, 2);
        assert!((p - 0.1667).abs() < 0.001, "got {p}");
    }

    #[test]
    fn test_level_progress_clamps() {
        assert!((level_progress(10_000, 2) - 1.0).abs() < f32::EPSILON);
        assert!(level_progress(0, 3).abs() < f32::EPSILON);
    }

    #[test]
    fn test_level_progress_extreme_inputs() {
        let exps = [i64::MIN, -1, 0, 1, i64::MAX];
        let levels = [i32::MIN, -1, 0, 1, i32::MAX];
        for exp in exps {
            for level in levels {
                let p = level_progress(exp, level);
                assert!((0.0..=1.0).contains(&p), "exp {exp} level {level} gave {p}");
            }
        }
        assert!(level_progress(i64::MAX, i32::MIN).abs() < f32::EPSILON);
        assert!(level_progress(i64::MIN, 1).abs() < f32::EPSILON);
        assert!((level_progress(i64::MAX, 1) - 1.0).abs() < f32::EPSILON);
        assert!(level_progress(i64::MAX, i32::MAX).abs() < f32::EPSILON);
    }

    #[test]
    fn test_extreme_user_level_does_not_panic() {
        let mut user = User::new(1, "alice");
        user.user_level = Some(i32::MAX);
        user.exp = Some(i64::MAX);
        assert!(user.level_progress().abs() < f32::EPSILON);
    }

    #[test]
    fn test_level_zero_has_empty_range() {
        // Level 0 spans 100..0 which is an empty range.
        assert!(level_progress(50, 0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_display_level_prefers_user_level() {
        let mut user = User::new(1, "alice");
        user.level = 1;
        assert_eq!(user.display_level(), 1);
        user.user_level = Some(4);
        assert_eq!(user.display_level(), 4);
    }

    #[test]
    fn test_decode_sparse_user() {
        let user: User = serde_json::from_str(r#"{"id":7,"username":"bob"}"#).unwrap();
        assert_eq!(user.coins, 0);
        assert!(user.exp.is_none());
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let res: Result<UserEnvelope, _> = serde_json::from_str(r#"{"user":{"id":"x"}}"#);
        assert!(res.is_err());
    }
}
