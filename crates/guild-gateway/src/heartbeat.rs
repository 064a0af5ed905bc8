//! Heartbeat monitor
//!
//! Sends a probe every interval and gives up on the connection once
//! `FAILED_ACK_TOLERANCE` intervals pass without an acknowledgement.

use crate::connection::Connection;
use crate::state::SessionState;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::time::Duration;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;

/// Missed intervals tolerated before the connection is considered dead
pub const FAILED_ACK_TOLERANCE: u32 = 5;

/// Something a liveness probe can be sent through
#[async_trait]
pub(crate) trait Probe: Send + Sync {
    async fn probe(&self) -> Result<(), tungstenite::Error>;
}

#[async_trait]
impl Probe for Connection {
    async fn probe(&self) -> Result<(), tungstenite::Error> {
        self.ping().await
    }
}

/// Why the monitor stopped
#[derive(Debug)]
pub(crate) enum HeartbeatExit {
    /// The connection was closed deliberately
    Cancelled,
    /// No acknowledgement within the tolerance
    Stale { since_ack: Duration },
    /// The probe could not be written
    SendFailed(tungstenite::Error),
}

/// Run the monitor until cancelled or the connection fails
///
/// Staleness is checked before every probe, so a connection that has gone
/// quiet is dropped without sending another one.
pub(crate) async fn run(
    probe: &dyn Probe,
    state: &RwLock<SessionState>,
    interval: Duration,
    cancel: &CancellationToken,
) -> HeartbeatExit {
    let threshold = interval * FAILED_ACK_TOLERANCE;

    loop {
        let now = Instant::now();
        let last_ack = state.read().last_heartbeat_ack.unwrap_or(now);
        let since_ack = now.saturating_duration_since(last_ack);
        if since_ack >= threshold {
            return HeartbeatExit::Stale { since_ack };
        }

        state.write().record_sent(now);
        if let Err(error) = probe.probe().await {
            return HeartbeatExit::SendFailed(error);
        }
        state.write().data_ready = true;
        tracing::trace!(since_ack_ms = since_ack.as_millis(), "Heartbeat sent");

        tokio::select! {
            () = cancel.cancelled() => return HeartbeatExit::Cancelled,
            () = tokio::time::sleep(interval) => {}
        }
    }
}
