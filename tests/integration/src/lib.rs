//! Integration test utilities for the bot client
//!
//! Provides an in-process gateway server and an event recorder for
//! end-to-end tests of the session, gateway and REST crates.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
