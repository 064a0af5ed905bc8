//! # guild-gateway
//!
//! Realtime gateway client: websocket handshake, heartbeat monitoring, frame
//! decoding, and reconnection with exponential backoff.

mod connection;
pub mod decoder;
pub mod error;
mod gateway;
mod heartbeat;
mod read_loop;
mod reconnect;
mod state;

pub use connection::Connection;
pub use decoder::{Decoded, Frame, FrameDecoder, DEFAULT_MAX_FRAME_SIZE};
pub use error::{DecodeError, GatewayError, GatewayResult};
pub use gateway::Gateway;
pub use heartbeat::FAILED_ACK_TOLERANCE;
pub use reconnect::Backoff;
