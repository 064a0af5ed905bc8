//! Event hub
//!
//! Pairs the handler registry with the dispatch strategy chosen at
//! construction. Both the gateway and the REST executor emit through it.

use super::registry::HandlerRegistry;
use super::strategy::{Concurrent, DispatchStrategy, Sequential};
use crate::events::Event;
use async_trait::async_trait;
use std::sync::Arc;

/// Anything events can be emitted into
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one event
    async fn emit(&self, event: Event);
}

/// Which built-in strategy a hub uses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Await handlers in order on the emitting task
    Sequential,
    /// Spawn every handler as its own task
    #[default]
    Concurrent,
}

impl DispatchMode {
    /// Mode for a "sync events" flag
    #[must_use]
    pub const fn from_sync_events(sync_events: bool) -> Self {
        if sync_events {
            Self::Sequential
        } else {
            Self::Concurrent
        }
    }

    fn strategy(self) -> Box<dyn DispatchStrategy> {
        match self {
            Self::Sequential => Box::new(Sequential),
            Self::Concurrent => Box::new(Concurrent),
        }
    }
}

/// Handler registry plus dispatch strategy
#[derive(Debug)]
pub struct EventHub {
    registry: HandlerRegistry,
    strategy: Box<dyn DispatchStrategy>,
}

impl EventHub {
    /// Create a hub using a built-in mode
    #[must_use]
    pub fn new(mode: DispatchMode) -> Self {
        Self::with_strategy(mode.strategy())
    }

    /// Create a hub wrapped in Arc
    #[must_use]
    pub fn new_shared(mode: DispatchMode) -> Arc<Self> {
        Arc::new(Self::new(mode))
    }

    /// Create a hub with a custom strategy
    #[must_use]
    pub fn with_strategy(strategy: Box<dyn DispatchStrategy>) -> Self {
        Self {
            registry: HandlerRegistry::new(),
            strategy,
        }
    }

    /// The handler registry
    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Name of the active strategy
    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Dispatch one event to every handler currently registered for it
    pub async fn dispatch(&self, event: Event) {
        let handlers = self.registry.handlers_for(event.kind());
        if handlers.is_empty() {
            tracing::trace!(kind = %event.kind(), "No handlers for event");
            return;
        }

        tracing::trace!(
            kind = %event.kind(),
            handlers = handlers.len(),
            strategy = self.strategy.name(),
            "Dispatching event"
        );

        self.strategy.dispatch(event, handlers).await;
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new(DispatchMode::default())
    }
}

#[async_trait]
impl EventSink for EventHub {
    async fn emit(&self, event: Event) {
        self.dispatch(event).await;
    }
}
