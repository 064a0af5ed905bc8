//! Control payload definitions

use crate::models::BotUser;
use serde::{Deserialize, Serialize};

/// Payload for op 1 (Hello)
///
/// Sent by the server immediately after the connection is upgraded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval_ms: u64,

    /// Last message identifier seen by this bot, used for resuming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message_id: Option<String>,

    /// The bot user this connection is authenticated as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<BotUser>,
}

impl HelloPayload {
    /// Default heartbeat interval (22.5 seconds)
    pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 22_500;

    /// Create a Hello payload with custom interval
    #[must_use]
    pub fn with_interval(heartbeat_interval_ms: u64) -> Self {
        Self {
            heartbeat_interval_ms,
            last_message_id: None,
            user: None,
        }
    }

    /// Heartbeat interval as a `Duration`
    #[must_use]
    pub fn heartbeat_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.heartbeat_interval_ms)
    }
}

impl Default for HelloPayload {
    fn default() -> Self {
        Self::with_interval(Self::DEFAULT_HEARTBEAT_INTERVAL_MS)
    }
}
