//! Daily check-in models

use serde::{Deserialize, Serialize};

/// Whether the current user has checked in today
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinStatus {
    /// Already checked in today
    pub checked_in: bool,
    /// Allowed to check in now
    pub can_check: bool,
    /// Time of today's check-in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_time: Option<String>,
    /// Coins awarded for checking in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<i64>,
}

impl Default for CheckinStatus {
    /// Assume the user can still check in when the status is unknown
    fn default() -> Self {
        Self {
            checked_in: false,
            can_check: true,
            check_time: None,
            reward: None,
        }
    }
}

/// Result of checking in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinResponse {
    /// Generic reward value
    #[serde(default)]
    pub reward: Option<i64>,
    /// Coins awarded
    #[serde(default)]
    pub reward_coins: Option<i64>,
    /// Experience awarded
    #[serde(default)]
    pub reward_exp: Option<i64>,
    /// Coin balance afterwards
    #[serde(default)]
    pub total_coins: Option<i64>,
    /// Experience afterwards
    #[serde(default)]
    pub total_exp: Option<i64>,
    /// Level afterwards
    #[serde(default)]
    pub user_level: Option<i32>,
    /// Check-in time
    #[serde(default)]
    pub check_time: String,
}

impl CheckinResponse {
    /// Short summary such as `+50 coins, +25 exp`
    pub fn summary(&self) -> String {
        let coins = self.reward_coins.or(self.reward).unwrap_or(0);
        let exp = self.reward_exp.unwrap_or(0);
        format!("+{coins} coins, +{exp} exp")
    }
}
