//! Handler registry and dispatch
//!
//! Handlers are registered per event kind; the hub snapshots them for each
//! event and hands the batch to the configured strategy.

mod hub;
mod registry;
mod strategy;

pub use hub::{DispatchMode, EventHub, EventSink};
pub use registry::{BoxHandler, HandlerId, HandlerRegistry};
pub use strategy::{Concurrent, DispatchStrategy, Sequential};
