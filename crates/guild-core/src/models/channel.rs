//! Server channel shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of server channel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerChannelType {
    Announcements,
    #[default]
    Chat,
    Calendar,
    Forums,
    Media,
    Docs,
    Voice,
    List,
    Scheduling,
    Stream,
    #[serde(other)]
    Unknown,
}

/// A channel within a server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerChannel {
    pub id: String,
    #[serde(rename = "type")]
    pub channel_type: ServerChannelType,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub server_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    pub group_id: String,
    pub is_public: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_by: Option<String>,
    pub archived_at: Option<DateTime<Utc>>,
}
