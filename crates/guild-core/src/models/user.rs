//! User shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of account
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    User,
    Bot,
}

/// A user account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Text that mentions this user in message content
    #[must_use]
    pub fn mention(&self) -> String {
        format!("@{} ", self.name)
    }

    /// Markup that mentions this user inside an embed
    #[must_use]
    pub fn mention_embed(&self) -> String {
        format!("<@{}>", self.id)
    }
}

/// Reduced user shape embedded in bans
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    #[serde(rename = "type")]
    pub user_type: UserType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Nickname change info
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

/// The bot account a connection is authenticated as
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BotUser {
    pub id: String,
    pub bot_id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: String,
}
