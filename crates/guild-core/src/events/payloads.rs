//! Event payload definitions
//!
//! Defines the data structures for each gateway event type. The struct name
//! is the wire type tag (`t`) the gateway sends for it.

use crate::models::{
    BotUser, CalendarEvent, CalendarEventRsvp, ChatMessage, Doc, ForumTopic, ListItem,
    MemberRoles, Reaction, ServerChannel, ServerMember, ServerMemberBan, UserInfo, Webhook,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// === Synthetic Events ===

/// Emitted after a successful handshake
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Connect;

/// Emitted on every close, manual or error-triggered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Disconnect;

/// Emitted by the REST executor before it sleeps out a 429
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimit {
    /// How long the server asked us to wait
    pub retry_after: Duration,
    /// The URL that was throttled
    pub url: String,
}

impl RateLimit {
    #[must_use]
    pub fn new(retry_after: Duration, url: impl Into<String>) -> Self {
        Self {
            retry_after,
            url: url.into(),
        }
    }
}

// === Connection Events ===

/// Ready event payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Ready {
    pub last_message_id: String,
    pub heartbeat_interval_ms: u64,
    pub user: BotUser,
}

// === Message Events ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatMessageCreated {
    pub server_id: String,
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatMessageUpdated {
    pub server_id: String,
    pub message: ChatMessage,
}

/// Only the identifying fields of `message` are populated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatMessageDeleted {
    pub server_id: String,
    pub message: ChatMessage,
}

// === Member Events ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamMemberJoined {
    pub server_id: String,
    pub member: ServerMember,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamMemberRemoved {
    pub server_id: String,
    pub user_id: String,
    pub is_kick: bool,
    pub is_ban: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamMemberBanned {
    pub server_id: String,
    pub server_member_ban: ServerMemberBan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamMemberUnbanned {
    pub server_id: String,
    pub server_member_ban: ServerMemberBan,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamMemberUpdated {
    pub server_id: String,
    pub user_info: UserInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamRolesUpdated {
    pub server_id: String,
    pub member_role_ids: Vec<MemberRoles>,
}

// === Channel and Webhook Events ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamChannelCreated {
    pub server_id: String,
    pub channel: ServerChannel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamChannelUpdated {
    pub server_id: String,
    pub channel: ServerChannel,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamWebhookCreated {
    pub server_id: String,
    pub webhook: Webhook,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TeamWebhookUpdated {
    pub server_id: String,
    pub webhook: Webhook,
}

// === Doc Events ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocCreated {
    pub server_id: String,
    pub doc: Doc,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocUpdated {
    pub server_id: String,
    pub doc: Doc,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocDeleted {
    pub server_id: String,
    pub doc: Doc,
}

// === Calendar Events ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarEventCreated {
    pub server_id: String,
    pub calendar_event: CalendarEvent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarEventUpdated {
    pub server_id: String,
    pub calendar_event: CalendarEvent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarEventDeleted {
    pub server_id: String,
    pub calendar_event: CalendarEvent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarEventRsvpUpdated {
    pub server_id: String,
    pub calendar_event_rsvp: CalendarEventRsvp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarEventRsvpManyUpdated {
    pub server_id: String,
    pub calendar_event_rsvps: Vec<CalendarEventRsvp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarEventRsvpDeleted {
    pub server_id: String,
    pub calendar_event_rsvp: CalendarEventRsvp,
}

// === List Events ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListItemCreated {
    pub server_id: String,
    pub list_item: ListItem,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListItemUpdated {
    pub server_id: String,
    pub list_item: ListItem,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListItemDeleted {
    pub server_id: String,
    pub list_item: ListItem,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListItemCompleted {
    pub server_id: String,
    pub list_item: ListItem,
}

// === Reaction Events ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelMessageReactionCreated {
    pub server_id: String,
    pub reaction: Reaction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChannelMessageReactionDeleted {
    pub server_id: String,
    pub reaction: Reaction,
}

// === Forum Events ===

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForumTopicCreated {
    pub server_id: String,
    pub forum_topic: ForumTopic,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForumTopicUpdated {
    pub server_id: String,
    pub forum_topic: ForumTopic,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForumTopicDeleted {
    pub server_id: String,
    pub forum_topic: ForumTopic,
}
