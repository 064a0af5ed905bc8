//! Docs, calendar events, list items, forum topics and reactions

use super::Mentions;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A doc in a docs channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Doc {
    pub id: i64,
    pub server_id: String,
    pub channel_id: String,
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Mentions>,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

/// A calendar event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: i64,
    pub server_id: String,
    pub channel_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    pub starts_at: Option<DateTime<Utc>>,
    /// Duration in minutes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    pub is_private: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Mentions>,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<Cancellation>,
}

/// Why and by whom a calendar event was cancelled
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Cancellation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_by: String,
}

/// Attendance answer for a calendar event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RsvpStatus {
    Going,
    Maybe,
    Declined,
    Invited,
    Waitlisted,
    #[serde(rename = "not going")]
    NotGoing,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A member's RSVP to a calendar event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CalendarEventRsvp {
    pub calendar_event_id: i64,
    pub channel_id: String,
    pub server_id: String,
    pub user_id: String,
    pub status: RsvpStatus,
    pub created_by: String,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// An item in a list channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,
    pub server_id: String,
    pub channel_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Mentions>,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_webhook_id: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_list_item_id: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<ListItemNote>,
}

/// Note attached to a list item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListItemNote {
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Mentions>,
    pub content: String,
}

/// A forum topic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForumTopic {
    pub id: i64,
    pub server_id: String,
    pub channel_id: String,
    pub title: String,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_webhook_id: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// An emote reaction on a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Reaction {
    pub channel_id: String,
    pub message_id: String,
    pub created_by: String,
    pub emote: Emote,
}

/// An emote
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Emote {
    pub id: i64,
    pub name: String,
    pub url: String,
}
