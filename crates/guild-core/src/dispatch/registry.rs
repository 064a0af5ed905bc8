//! Handler registry
//!
//! Maps event kinds to ordered handler lists using `DashMap` for concurrent
//! access. Insertion order is dispatch order.

use crate::events::{Event, EventKind, EventPayload};
use dashmap::DashMap;
use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Type-erased event handler
pub type BoxHandler = Arc<dyn Fn(Event) -> BoxFuture<'static, ()> + Send + Sync>;

/// Token returned by every registration, used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Get the raw value
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler-{}", self.0)
    }
}

#[derive(Clone)]
struct Registration {
    id: HandlerId,
    once: bool,
    handler: BoxHandler,
}

/// Registered handlers, per event kind plus a catch-all list
pub struct HandlerRegistry {
    /// Handlers by kind, in registration order
    handlers: DashMap<EventKind, Vec<Registration>>,

    /// Handlers invoked for every event after the kind-specific ones
    catch_all: RwLock<Vec<Registration>>,

    next_id: AtomicU64,
}

impl HandlerRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: DashMap::new(),
            catch_all: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn next_id(&self) -> HandlerId {
        HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Register a type-erased handler for `kind`
    pub fn subscribe(&self, kind: EventKind, handler: BoxHandler, once: bool) -> HandlerId {
        let id = self.next_id();
        self.handlers
            .entry(kind)
            .or_default()
            .push(Registration { id, once, handler });

        tracing::debug!(handler_id = %id, kind = %kind, once, "Handler registered");

        id
    }

    /// Register a typed handler invoked for every event of shape `T`
    pub fn add<T, F, Fut>(&self, handler: F) -> HandlerId
    where
        T: EventPayload,
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.subscribe(T::KIND, typed(handler), false)
    }

    /// Register a typed handler invoked for the next event of shape `T` only
    pub fn add_once<T, F, Fut>(&self, handler: F) -> HandlerId
    where
        T: EventPayload,
        F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.subscribe(T::KIND, typed(handler), true)
    }

    /// Register a handler invoked for every event of every kind
    pub fn add_catch_all<F, Fut>(&self, handler: F) -> HandlerId
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id();
        let handler: BoxHandler = Arc::new(move |event: Event| handler(event).boxed());
        self.catch_all.write().push(Registration {
            id,
            once: false,
            handler,
        });

        tracing::debug!(handler_id = %id, "Catch-all handler registered");

        id
    }

    /// Remove a registration
    ///
    /// Returns `false` if no such registration exists.
    pub fn remove(&self, id: HandlerId) -> bool {
        for mut entry in self.handlers.iter_mut() {
            let list = entry.value_mut();
            if let Some(index) = list.iter().position(|r| r.id == id) {
                list.remove(index);
                tracing::debug!(handler_id = %id, "Handler removed");
                return true;
            }
        }

        let mut catch_all = self.catch_all.write();
        if let Some(index) = catch_all.iter().position(|r| r.id == id) {
            catch_all.remove(index);
            tracing::debug!(handler_id = %id, "Catch-all handler removed");
            return true;
        }

        false
    }

    /// Snapshot the handlers to invoke for one event of `kind`
    ///
    /// One-shot registrations are removed under the same lock that snapshots
    /// them, so concurrent callers can never both receive the same one.
    #[must_use]
    pub fn handlers_for(&self, kind: EventKind) -> Vec<BoxHandler> {
        let mut snapshot = Vec::new();

        if let Some(mut list) = self.handlers.get_mut(&kind) {
            snapshot.extend(list.iter().map(|r| Arc::clone(&r.handler)));
            list.retain(|r| !r.once);
        }

        snapshot.extend(self.catch_all.read().iter().map(|r| Arc::clone(&r.handler)));
        snapshot
    }

    /// Number of handlers registered for `kind`, excluding catch-alls
    #[must_use]
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.handlers.get(&kind).map_or(0, |list| list.len())
    }

    /// Number of catch-all handlers
    #[must_use]
    pub fn catch_all_count(&self) -> usize {
        self.catch_all.read().len()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("kinds", &self.handlers.len())
            .field("catch_all", &self.catch_all_count())
            .finish_non_exhaustive()
    }
}

fn typed<T, F, Fut>(handler: F) -> BoxHandler
where
    T: EventPayload,
    F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |event: Event| match T::from_event(&event) {
        Some(payload) => handler(payload).boxed(),
        None => futures::future::ready(()).boxed(),
    })
}
