//! # guild-core
//!
//! Domain layer containing the gateway wire envelope, typed event payloads,
//! the event registry, and the handler registry with its dispatch strategies.
//! This crate has no transport code.

pub mod dispatch;
pub mod events;
pub mod models;
pub mod protocol;

// Re-export commonly used types at crate root
pub use dispatch::{
    BoxHandler, Concurrent, DispatchMode, DispatchStrategy, EventHub, EventSink, HandlerId,
    HandlerRegistry, Sequential,
};
pub use events::{Event, EventKind, EventPayload, EventRegistry, RegistryEntry};
pub use protocol::{CloseCode, Envelope, HelloPayload, OpCode};
