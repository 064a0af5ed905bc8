//! Gateway error types

use guild_core::OpCode;
use std::time::Duration;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Failure to turn an inbound frame into an envelope
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Binary frame was not valid zlib
    #[error("Failed to inflate frame: {0}")]
    Inflate(#[from] std::io::Error),

    /// Binary frame inflated past the size cap
    #[error("Inflated frame exceeds {limit} bytes")]
    TooLarge { limit: usize },

    /// Frame body was not a valid envelope
    #[error("Invalid envelope: {0}")]
    Json(#[from] serde_json::Error),
}

/// Gateway error type
#[derive(Debug, Error)]
pub enum GatewayError {
    /// `open` was called while a connection is installed
    #[error("Gateway connection already open")]
    AlreadyOpen,

    /// The hello exchange failed
    #[error("Handshake failed: {0}")]
    Handshake(String),

    /// The first frame carried an op code other than hello
    #[error("Expected hello, got op {0}")]
    UnexpectedOpCode(OpCode),

    /// The websocket transport failed
    #[error("Transport error: {0}")]
    Transport(#[from] tungstenite::Error),

    /// A frame could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The token or a header value could not be encoded
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] tungstenite::http::header::InvalidHeaderValue),

    /// No hello frame arrived in time
    #[error("Handshake timed out after {0:?}")]
    HandshakeTimeout(Duration),
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
