//! Dispatch strategies
//!
//! Chosen once when the hub is built: `Sequential` awaits every handler in
//! order on the dispatching task, `Concurrent` spawns each handler as its own
//! task and returns immediately.

use super::registry::BoxHandler;
use crate::events::{Event, EventKind};
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// How a batch of handlers is run for one event
#[async_trait]
pub trait DispatchStrategy: fmt::Debug + Send + Sync {
    /// Run `handlers` for `event`
    async fn dispatch(&self, event: Event, handlers: Vec<BoxHandler>);

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

/// Runs handlers one after another, in registration order
///
/// The dispatching task (the gateway read loop) is blocked until the last
/// handler returns.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

#[async_trait]
impl DispatchStrategy for Sequential {
    async fn dispatch(&self, event: Event, handlers: Vec<BoxHandler>) {
        for handler in handlers {
            invoke(&handler, event.clone()).await;
        }
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}

/// Spawns every handler onto the runtime
///
/// No ordering between handlers; slow handlers never block the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Concurrent;

#[async_trait]
impl DispatchStrategy for Concurrent {
    async fn dispatch(&self, event: Event, handlers: Vec<BoxHandler>) {
        for handler in handlers {
            let event = event.clone();
            tokio::spawn(async move {
                invoke(&handler, event).await;
            });
        }
    }

    fn name(&self) -> &'static str {
        "concurrent"
    }
}

/// Run one handler, containing any panic it raises
///
/// Both the synchronous call that builds the future and the future itself
/// are guarded.
pub(crate) async fn invoke(handler: &BoxHandler, event: Event) {
    let kind = event.kind();

    let future = match panic::catch_unwind(AssertUnwindSafe(|| handler(event))) {
        Ok(future) => future,
        Err(payload) => {
            report_panic(kind, payload.as_ref());
            return;
        }
    };

    if let Err(payload) = AssertUnwindSafe(future).catch_unwind().await {
        report_panic(kind, payload.as_ref());
    }
}

fn report_panic(kind: EventKind, payload: &(dyn Any + Send)) {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");

    tracing::error!(kind = %kind, panic = %message, "Event handler panicked");
}
