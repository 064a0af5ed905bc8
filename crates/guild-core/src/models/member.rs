//! Server member shapes

use super::{User, UserSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A member of a server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerMember {
    pub user: User,
    pub role_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
    pub is_owner: bool,
}

/// A ban record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerMemberBan {
    pub user: UserSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub created_by: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Role ids held by one member
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemberRoles {
    pub user_id: String,
    pub role_ids: Vec<i64>,
}
