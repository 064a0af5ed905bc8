//! Resource shapes carried by gateway events
//!
//! Partial mirrors of the API resources. Every field defaults so a payload
//! that fails to decode can be replaced by its zero value.

mod channel;
mod content;
mod member;
mod message;
mod user;
mod webhook;

pub use channel::{ServerChannel, ServerChannelType};
pub use content::{
    CalendarEvent, CalendarEventRsvp, Cancellation, Doc, Emote, ForumTopic, ListItem,
    ListItemNote, Reaction, RsvpStatus,
};
pub use member::{MemberRoles, ServerMember, ServerMemberBan};
pub use message::{
    ChatEmbed, ChatEmbedAuthor, ChatEmbedField, ChatEmbedFooter, ChatEmbedImage,
    ChatEmbedThumbnail, ChatMessage, MentionId, Mentions, MessageCreate, MessageType, MessageUpdate,
};
pub use user::{BotUser, User, UserInfo, UserSummary, UserType};
pub use webhook::Webhook;
