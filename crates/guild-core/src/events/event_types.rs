//! Gateway event types
//!
//! `EventKind`, `Event` and the `EventPayload` impls are all generated from
//! the single list at the bottom of this file, so a wire tag, its kind and
//! its payload variant cannot drift apart.

use super::payloads;
use super::registry::RegistryEntry;
use crate::protocol::Envelope;
use std::fmt;
use std::sync::Arc;

/// A payload shape that can travel through the handler registry
pub trait EventPayload: fmt::Debug + Send + Sync + 'static {
    /// The kind handlers for this payload are registered under
    const KIND: EventKind;

    /// Wrap a payload into its `Event` variant
    fn wrap(payload: Arc<Self>) -> Event;

    /// Borrow the payload back out of an event of the matching kind
    fn from_event(event: &Event) -> Option<Arc<Self>>;
}

macro_rules! define_events {
    (
        synthetic { $($sname:ident($sty:ty) => $stag:literal),+ $(,)? }
        dispatched { $($name:ident),+ $(,)? }
    ) => {
        /// Identity of an event shape
        ///
        /// Dispatched kinds are named after their wire type tag. Synthetic
        /// kinds are produced by the client itself and never appear on the wire.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum EventKind {
            $($sname,)+
            $($name,)+
        }

        impl EventKind {
            /// Kinds that arrive as gateway dispatch frames
            pub const DISPATCHED: &'static [Self] = &[$(Self::$name),+];

            /// Kinds emitted by the client itself
            pub const SYNTHETIC: &'static [Self] = &[$(Self::$sname),+];

            /// Get the type tag for this kind
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$sname => $stag,)+
                    $(Self::$name => stringify!($name),)+
                }
            }
        }

        /// A decoded event, ready for dispatch
        #[derive(Debug, Clone)]
        pub enum Event {
            $($sname(Arc<$sty>),)+
            $($name(Arc<payloads::$name>),)+
        }

        impl Event {
            /// The kind of this event
            #[must_use]
            pub const fn kind(&self) -> EventKind {
                match self {
                    $(Self::$sname(_) => EventKind::$sname,)+
                    $(Self::$name(_) => EventKind::$name,)+
                }
            }
        }

        $(
            impl EventPayload for $sty {
                const KIND: EventKind = EventKind::$sname;

                fn wrap(payload: Arc<Self>) -> Event {
                    Event::$sname(payload)
                }

                fn from_event(event: &Event) -> Option<Arc<Self>> {
                    match event {
                        Event::$sname(payload) => Some(Arc::clone(payload)),
                        _ => None,
                    }
                }
            }
        )+

        $(
            impl EventPayload for payloads::$name {
                const KIND: EventKind = EventKind::$name;

                fn wrap(payload: Arc<Self>) -> Event {
                    Event::$name(payload)
                }

                fn from_event(event: &Event) -> Option<Arc<Self>> {
                    match event {
                        Event::$name(payload) => Some(Arc::clone(payload)),
                        _ => None,
                    }
                }
            }
        )+

        /// Registry entries for every dispatched kind
        pub(super) fn standard_entries() -> Vec<RegistryEntry> {
            vec![$(RegistryEntry::of::<payloads::$name>(),)+]
        }
    };
}

define_events! {
    synthetic {
        Connect(payloads::Connect) => "__CONNECT__",
        Disconnect(payloads::Disconnect) => "__DISCONNECT__",
        RateLimit(payloads::RateLimit) => "__RATE_LIMIT__",
        Raw(Envelope) => "__EVENT__",
    }
    dispatched {
        Ready,
        ChatMessageCreated,
        ChatMessageUpdated,
        ChatMessageDeleted,
        TeamMemberJoined,
        TeamMemberRemoved,
        TeamMemberBanned,
        TeamMemberUnbanned,
        TeamMemberUpdated,
        TeamRolesUpdated,
        TeamChannelCreated,
        TeamChannelUpdated,
        TeamWebhookCreated,
        TeamWebhookUpdated,
        DocCreated,
        DocUpdated,
        DocDeleted,
        CalendarEventCreated,
        CalendarEventUpdated,
        CalendarEventDeleted,
        CalendarEventRsvpUpdated,
        CalendarEventRsvpManyUpdated,
        CalendarEventRsvpDeleted,
        ListItemCreated,
        ListItemUpdated,
        ListItemDeleted,
        ListItemCompleted,
        ChannelMessageReactionCreated,
        ChannelMessageReactionDeleted,
        ForumTopicCreated,
        ForumTopicUpdated,
        ForumTopicDeleted,
    }
}

impl EventKind {
    /// Look up a dispatched kind by its wire type tag
    ///
    /// Synthetic tags never match.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::DISPATCHED
            .iter()
            .copied()
            .find(|kind| kind.as_str() == tag)
    }

    /// Check if the client produces this kind itself
    #[must_use]
    pub fn is_synthetic(self) -> bool {
        Self::SYNTHETIC.contains(&self)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Event {
    /// The type tag of this event
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Extract the payload if this event is of type `T`
    #[must_use]
    pub fn payload<T: EventPayload>(&self) -> Option<Arc<T>> {
        T::from_event(self)
    }

    /// Build an event from an owned payload
    #[must_use]
    pub fn from_payload<T: EventPayload>(payload: T) -> Self {
        T::wrap(Arc::new(payload))
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Event({})", self.tag())
    }
}
