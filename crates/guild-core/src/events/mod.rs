//! Gateway events
//!
//! Typed payloads for every dispatch event, the `Event` union that carries
//! them, and the registry that maps wire tags onto them.

mod event_types;
mod payloads;
mod registry;

pub use event_types::{Event, EventKind, EventPayload};
pub use payloads::{
    CalendarEventCreated, CalendarEventDeleted, CalendarEventRsvpDeleted,
    CalendarEventRsvpManyUpdated, CalendarEventRsvpUpdated, CalendarEventUpdated,
    ChannelMessageReactionCreated, ChannelMessageReactionDeleted, ChatMessageCreated,
    ChatMessageDeleted, ChatMessageUpdated, Connect, Disconnect, DocCreated, DocDeleted,
    DocUpdated, ForumTopicCreated, ForumTopicDeleted, ForumTopicUpdated, ListItemCompleted,
    ListItemCreated, ListItemDeleted, ListItemUpdated, RateLimit, Ready, TeamChannelCreated,
    TeamChannelUpdated, TeamMemberBanned, TeamMemberJoined, TeamMemberRemoved,
    TeamMemberUnbanned, TeamMemberUpdated, TeamRolesUpdated, TeamWebhookCreated,
    TeamWebhookUpdated,
};
pub use registry::{EventRegistry, RegistryEntry};
