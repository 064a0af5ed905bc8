//! Session state
//!
//! Everything the heartbeat, read loop and lifecycle calls share. Guarded by
//! a single `parking_lot::RwLock` owned by the gateway; never held across an
//! await.

use crate::connection::Connection;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// An installed connection and the signal its tasks listen on
///
/// Present exactly while the gateway is open.
#[derive(Debug, Clone)]
pub(crate) struct Live {
    pub connection: Arc<Connection>,
    pub cancel: CancellationToken,
}

/// A recovery started for one lost connection
#[derive(Debug, Clone)]
pub(crate) struct Recovery {
    pub connection_id: Uuid,
    pub stop: CancellationToken,
}

/// Shared gateway session state
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub live: Option<Live>,
    pub last_heartbeat_sent: Option<Instant>,
    pub last_heartbeat_ack: Option<Instant>,
    /// Round trip of the most recently acknowledged probe
    pub last_latency: Option<Duration>,
    /// Set once a heartbeat probe has gone out on the current connection
    pub data_ready: bool,
    /// Heartbeat and read-loop tasks of the most recent connection
    pub tasks: Vec<JoinHandle<()>>,
    /// Installed when a connection is lost, before its close starts
    pub recovery: Option<Recovery>,
}

impl SessionState {
    pub fn is_open(&self) -> bool {
        self.live.is_some()
    }

    /// Check if `connection` is the one currently installed
    pub fn owns(&self, connection: &Arc<Connection>) -> bool {
        self.live
            .as_ref()
            .is_some_and(|live| Arc::ptr_eq(&live.connection, connection))
    }

    pub fn record_sent(&mut self, at: Instant) {
        self.last_heartbeat_sent = Some(at);
    }

    /// Record an acknowledgement; the first one after a probe sets the latency
    pub fn record_ack(&mut self, at: Instant) {
        if let Some(sent) = self.last_heartbeat_sent {
            let answered = matches!(self.last_heartbeat_ack, Some(ack) if ack >= sent);
            if !answered && at >= sent {
                self.last_latency = Some(at - sent);
            }
        }
        self.last_heartbeat_ack = Some(at);
    }

    /// Round trip of the last acknowledged probe
    ///
    /// Keeps the previous value while a newer probe is still unanswered.
    pub fn heartbeat_latency(&self) -> Option<Duration> {
        self.last_latency
    }

    /// Check if recovery has already started for `connection`
    pub fn recovering(&self, connection: &Connection) -> bool {
        self.recovery
            .as_ref()
            .is_some_and(|recovery| recovery.connection_id == connection.id())
    }
}
