//! Event registry
//!
//! Immutable mapping from a wire type tag to the constructor and decoder of
//! its payload shape. Built once and shared behind an `Arc`.

use super::event_types::{standard_entries, Event, EventKind, EventPayload};
use crate::protocol::Envelope;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// One type tag and how to build its event
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    kind: EventKind,
    new: fn() -> Event,
    decode: fn(&Value) -> Result<Event, serde_json::Error>,
}

impl RegistryEntry {
    /// Entry for payload type `T`
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: EventPayload + Default + DeserializeOwned,
    {
        Self {
            kind: T::KIND,
            new: new_event::<T>,
            decode: decode_event::<T>,
        }
    }

    /// The kind this entry produces
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// A zero-valued event of this kind
    #[must_use]
    pub fn new_event(&self) -> Event {
        (self.new)()
    }

    /// Decode raw payload data into an event of this kind
    pub fn decode(&self, data: &Value) -> Result<Event, serde_json::Error> {
        (self.decode)(data)
    }
}

fn new_event<T: EventPayload + Default>() -> Event {
    T::wrap(Arc::new(T::default()))
}

fn decode_event<T: EventPayload + DeserializeOwned>(data: &Value) -> Result<Event, serde_json::Error> {
    T::deserialize(data).map(|payload| T::wrap(Arc::new(payload)))
}

/// Type tag → payload shape mapping
#[derive(Debug, Clone)]
pub struct EventRegistry {
    entries: HashMap<&'static str, RegistryEntry>,
}

impl EventRegistry {
    /// Registry holding every event the gateway is known to send
    #[must_use]
    pub fn standard() -> Self {
        Self::from_entries(standard_entries())
    }

    /// Registry holding exactly the given entries
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = RegistryEntry>) -> Self {
        let entries = entries
            .into_iter()
            .map(|entry| (entry.kind.as_str(), entry))
            .collect();
        Self { entries }
    }

    /// Look up the entry for a type tag
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&RegistryEntry> {
        self.entries.get(tag)
    }

    /// Check if a type tag is known
    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Number of registered tags
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no tags are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode the typed event carried by an envelope
    ///
    /// Returns `None` when the tag is not registered. A payload that fails to
    /// decode is logged and replaced with the zero value of its shape.
    #[must_use]
    pub fn decode(&self, envelope: &Envelope) -> Option<Event> {
        let tag = envelope.event_type();
        let entry = self.get(tag)?;
        let data = envelope.d.as_ref().unwrap_or(&Value::Null);

        match entry.decode(data) {
            Ok(event) => Some(event),
            Err(error) => {
                tracing::warn!(
                    event_type = %tag,
                    message_id = ?envelope.s,
                    error = %error,
                    "Failed to decode event payload, dispatching zero value"
                );
                Some(entry.new_event())
            }
        }
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
