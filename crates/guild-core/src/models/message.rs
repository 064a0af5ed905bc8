//! Chat message shapes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of chat message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Default,
    System,
}

/// A chat message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub server_id: String,
    pub channel_id: String,
    pub content: String,
    pub embeds: Vec<ChatEmbed>,
    pub reply_message_ids: Vec<String>,
    /// Only visible to those mentioned or replied to
    pub is_private: bool,
    pub is_silent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions: Option<Mentions>,
    pub created_at: Option<DateTime<Utc>>,
    pub created_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_webhook_id: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Rich embed attached to a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatEmbed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<ChatEmbedFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<ChatEmbedThumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ChatEmbedImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<ChatEmbedAuthor>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<ChatEmbedField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatEmbedFooter {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatEmbedThumbnail {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatEmbedImage {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatEmbedAuthor {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatEmbedField {
    pub name: String,
    pub value: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub inline: bool,
}

/// Users, channels and roles mentioned by a piece of content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mentions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<MentionId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<MentionId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<MentionId>,
    pub everyone: bool,
    pub here: bool,
}

/// A single mentioned id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MentionId {
    pub id: serde_json::Value,
}

/// Request body for creating a message
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCreate {
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_private: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_silent: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reply_message_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<ChatEmbed>,
}

impl MessageCreate {
    /// A plain text message
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }
}

/// Request body for editing a message
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<ChatEmbed>,
}
