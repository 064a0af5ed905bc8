//! Read loop
//!
//! Pulls frames off the websocket, decodes them, and emits the resulting
//! events. Any read failure ends the loop as a lost connection.

use crate::decoder::{Decoded, Frame, FrameDecoder};
use crate::state::SessionState;
use futures_util::{Stream, StreamExt};
use guild_core::EventSink;
use parking_lot::RwLock;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_util::sync::CancellationToken;

/// Why the read loop stopped
#[derive(Debug)]
pub(crate) enum ReadExit {
    /// The connection was closed deliberately
    Cancelled,
    /// The transport failed, ended, or the server sent a close frame
    Lost(String),
}

/// Run the loop until cancelled or the connection is lost
pub(crate) async fn run<S>(
    mut source: S,
    decoder: &FrameDecoder,
    sink: &dyn EventSink,
    state: &RwLock<SessionState>,
    cancel: &CancellationToken,
) -> ReadExit
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => return ReadExit::Cancelled,
            next = source.next() => next,
        };

        let message = match next {
            Some(Ok(message)) => message,
            Some(Err(error)) => return ReadExit::Lost(error.to_string()),
            None => return ReadExit::Lost("stream ended".to_string()),
        };

        let envelope = match decoder.classify(message) {
            Ok(Frame::Envelope(envelope)) => envelope,
            Ok(Frame::Ack) => {
                state.write().record_ack(Instant::now());
                tracing::trace!("Heartbeat acknowledged");
                continue;
            }
            Ok(Frame::Close(frame)) => {
                return ReadExit::Lost(format!("server sent close frame: {frame:?}"));
            }
            Ok(Frame::Ignore) => continue,
            Err(error) => {
                tracing::warn!(error = %error, "Failed to decode frame");
                continue;
            }
        };

        tracing::debug!(envelope = %envelope, "Received envelope");

        match decoder.decode(envelope) {
            Decoded::Hello(_) => {
                tracing::debug!("Ignoring hello outside handshake");
            }
            Decoded::Dispatch { typed, raw } => {
                if let Some(event) = typed {
                    sink.emit(event).await;
                }
                sink.emit(raw).await;
            }
        }
    }
}
