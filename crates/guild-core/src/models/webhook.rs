//! Webhook shape

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A server webhook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub name: String,
    pub server_id: String,
    pub channel_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}
