//! Frame decoder
//!
//! Classifies raw websocket messages and turns payload frames into events.
//! Binary frames carry zlib-compressed JSON, text frames plain JSON.

use crate::error::DecodeError;
use flate2::read::ZlibDecoder;
use guild_core::{Envelope, Event, EventRegistry};
use std::io::Read;
use std::sync::Arc;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

/// A classified inbound websocket message
#[derive(Debug)]
pub enum Frame {
    /// Acknowledgement of a heartbeat probe
    Ack,
    /// A JSON envelope
    Envelope(Envelope),
    /// The server closed the connection
    Close(Option<CloseFrame<'static>>),
    /// Nothing for the client to act on
    Ignore,
}

/// What an envelope means to the client
#[derive(Debug)]
pub enum Decoded {
    /// Op 1; only meaningful during the handshake
    Hello(Envelope),
    /// A dispatch: the typed event if the tag is registered, then the raw
    /// envelope event that is always emitted
    Dispatch { typed: Option<Event>, raw: Event },
}

/// Largest inflated binary frame, matching tungstenite's default message cap
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 << 20;

/// Decodes frames against an event registry
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    registry: Arc<EventRegistry>,
    max_frame_size: usize,
}

impl FrameDecoder {
    /// Create a decoder for `registry`
    #[must_use]
    pub fn new(registry: Arc<EventRegistry>) -> Self {
        Self {
            registry,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }

    /// Cap the inflated size of binary frames at `limit` bytes
    #[must_use]
    pub fn with_max_frame_size(mut self, limit: usize) -> Self {
        self.max_frame_size = limit;
        self
    }

    /// The registry this decoder looks tags up in
    #[must_use]
    pub fn registry(&self) -> &EventRegistry {
        &self.registry
    }

    /// Classify one websocket message
    pub fn classify(&self, message: Message) -> Result<Frame, DecodeError> {
        match message {
            Message::Text(text) => Ok(Frame::Envelope(Envelope::from_slice(text.as_bytes())?)),
            Message::Binary(bytes) => {
                let inflated = inflate(&bytes, self.max_frame_size)?;
                Ok(Frame::Envelope(Envelope::from_slice(&inflated)?))
            }
            Message::Pong(_) => Ok(Frame::Ack),
            Message::Close(frame) => Ok(Frame::Close(frame)),
            Message::Ping(_) | Message::Frame(_) => Ok(Frame::Ignore),
        }
    }

    /// Route an envelope
    #[must_use]
    pub fn decode(&self, envelope: Envelope) -> Decoded {
        if envelope.op.is_hello() {
            return Decoded::Hello(envelope);
        }

        let typed = self.registry.decode(&envelope);
        if typed.is_none() {
            tracing::warn!(
                op = %envelope.op,
                message_id = ?envelope.s,
                event_type = %envelope.event_type(),
                "Unknown event"
            );
        }

        Decoded::Dispatch {
            typed,
            raw: Event::from_payload(envelope),
        }
    }
}

fn inflate(bytes: &[u8], limit: usize) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::with_capacity(bytes.len().saturating_mul(4).min(limit));
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    ZlibDecoder::new(bytes).take(cap).read_to_end(&mut out)?;
    if out.len() > limit {
        return Err(DecodeError::TooLarge { limit });
    }
    Ok(out)
}
