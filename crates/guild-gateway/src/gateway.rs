//! Gateway session
//!
//! Owns the connection lifecycle: open with handshake, the heartbeat and
//! read-loop tasks spawned per connection, close, and recovery after the
//! connection is lost.

use crate::connection::{await_hello, Connection, WsSource};
use crate::decoder::FrameDecoder;
use crate::error::{GatewayError, GatewayResult};
use crate::heartbeat::{self, HeartbeatExit};
use crate::read_loop::{self, ReadExit};
use crate::reconnect::Backoff;
use crate::state::{Live, Recovery, SessionState};
use guild_common::GatewayConfig;
use guild_core::events::{Connect, Disconnect};
use guild_core::{CloseCode, Event, EventRegistry, EventSink, HelloPayload};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Realtime gateway client
///
/// Dropping the handle cancels the connection tasks and any reconnect loop.
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    config: GatewayConfig,
    token: String,
    decoder: FrameDecoder,
    sink: Arc<dyn EventSink>,
    state: RwLock<SessionState>,
    /// Serializes open and close
    lifecycle: tokio::sync::Mutex<()>,
    /// Parent of every connection and recovery token
    lifetime: CancellationToken,
}

impl Gateway {
    /// Create a closed gateway
    #[must_use]
    pub fn new(
        config: GatewayConfig,
        token: impl Into<String>,
        registry: Arc<EventRegistry>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                config,
                token: token.into(),
                decoder: FrameDecoder::new(registry),
                sink,
                state: RwLock::new(SessionState::default()),
                lifecycle: tokio::sync::Mutex::new(()),
                lifetime: CancellationToken::new(),
            }),
        }
    }

    /// Connect and complete the hello handshake
    ///
    /// Emits `Connect` and starts the heartbeat and read loop. On any failure
    /// no connection is left installed.
    pub async fn open(&self) -> GatewayResult<()> {
        self.inner.open().await
    }

    /// Close with a normal closure code
    pub async fn close(&self) {
        self.close_with_code(CloseCode::Normal).await;
    }

    /// Close with `code`
    ///
    /// Always emits `Disconnect`, even when already closed. Also stops any
    /// recovery in progress, including one whose close is still running.
    pub async fn close_with_code(&self, code: CloseCode) {
        self.inner.stop_recovery();
        self.inner.close_with_code(code).await;
    }

    /// Check if a connection is installed
    pub fn is_open(&self) -> bool {
        self.inner.state.read().is_open()
    }

    /// Check if a heartbeat has gone out on the current connection
    pub fn data_ready(&self) -> bool {
        self.inner.state.read().data_ready
    }

    /// When the last heartbeat acknowledgement arrived
    pub fn last_heartbeat_ack(&self) -> Option<Instant> {
        self.inner.state.read().last_heartbeat_ack
    }

    /// When the last heartbeat probe was sent
    pub fn last_heartbeat_sent(&self) -> Option<Instant> {
        self.inner.state.read().last_heartbeat_sent
    }

    /// Round trip of the last acknowledged probe
    pub fn heartbeat_latency(&self) -> Option<Duration> {
        self.inner.state.read().heartbeat_latency()
    }

    /// ID of the installed connection
    pub fn connection_id(&self) -> Option<Uuid> {
        self.inner
            .state
            .read()
            .live
            .as_ref()
            .map(|live| live.connection.id())
    }

    /// Get the gateway configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.inner.lifetime.cancel();
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("url", &self.inner.config.url)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl GatewayInner {
    async fn open(self: &Arc<Self>) -> GatewayResult<()> {
        let _guard = self.lifecycle.lock().await;
        self.open_locked().await
    }

    /// Open with the lifecycle lock already held
    async fn open_locked(self: &Arc<Self>) -> GatewayResult<()> {
        if self.state.read().is_open() {
            return Err(GatewayError::AlreadyOpen);
        }

        self.join_previous_tasks().await;

        tracing::info!(url = %self.config.url, "Connecting to gateway");

        let timeout = self.config.handshake_timeout;
        let (connection, source, hello) = tokio::time::timeout(timeout, self.handshake())
            .await
            .map_err(|_| GatewayError::HandshakeTimeout(timeout))??;

        let cancel = self.lifetime.child_token();
        {
            let mut state = self.state.write();
            state.live = Some(Live {
                connection: Arc::clone(&connection),
                cancel: cancel.clone(),
            });
            state.last_heartbeat_ack = Some(Instant::now());
            state.last_heartbeat_sent = None;
            state.last_latency = None;
            state.data_ready = false;
        }

        tracing::info!(
            connection_id = %connection.id(),
            heartbeat_interval_ms = hello.heartbeat_interval_ms,
            last_message_id = ?hello.last_message_id,
            "Gateway connection opened"
        );

        let heartbeat = tokio::spawn({
            let inner = Arc::clone(self);
            let connection = Arc::clone(&connection);
            let cancel = cancel.clone();
            let interval = hello.heartbeat_interval();
            async move { inner.heartbeat_task(connection, interval, cancel).await }
        });
        let reader = tokio::spawn({
            let inner = Arc::clone(self);
            async move { inner.read_task(connection, source, cancel).await }
        });
        self.state.write().tasks = vec![heartbeat, reader];

        Ok(())
    }

    async fn handshake(&self) -> GatewayResult<(Arc<Connection>, WsSource, HelloPayload)> {
        let (connection, mut source) = Connection::connect(&self.config.url, &self.token).await?;
        let hello = await_hello(&self.decoder, &mut source).await?;

        if hello.heartbeat_interval_ms == 0 {
            return Err(GatewayError::Handshake(
                "hello carried a zero heartbeat interval".to_string(),
            ));
        }

        Ok((connection, source, hello))
    }

    /// Wait for the previous connection's tasks, skipping the calling task
    async fn join_previous_tasks(&self) {
        let tasks = std::mem::take(&mut self.state.write().tasks);
        let current = tokio::task::try_id();

        for task in tasks {
            if Some(task.id()) == current {
                continue;
            }
            if let Err(error) = task.await {
                if error.is_panic() {
                    tracing::error!(error = %error, "Previous gateway task panicked");
                }
            }
        }
    }

    async fn heartbeat_task(
        self: Arc<Self>,
        connection: Arc<Connection>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        match heartbeat::run(connection.as_ref(), &self.state, interval, &cancel).await {
            HeartbeatExit::Cancelled => {
                tracing::debug!(connection_id = %connection.id(), "Heartbeat stopped");
            }
            HeartbeatExit::Stale { since_ack } => {
                tracing::error!(
                    connection_id = %connection.id(),
                    since_ack_ms = since_ack.as_millis(),
                    "Heartbeat not acknowledged, connection is dead"
                );
                self.connection_lost(&connection);
            }
            HeartbeatExit::SendFailed(error) => {
                tracing::error!(
                    connection_id = %connection.id(),
                    error = %error,
                    "Failed to send heartbeat"
                );
                self.connection_lost(&connection);
            }
        }
    }

    async fn read_task(
        self: Arc<Self>,
        connection: Arc<Connection>,
        source: WsSource,
        cancel: CancellationToken,
    ) {
        self.sink.emit(Event::from_payload(Connect)).await;

        match read_loop::run(source, &self.decoder, self.sink.as_ref(), &self.state, &cancel).await
        {
            ReadExit::Cancelled => {
                tracing::debug!(connection_id = %connection.id(), "Read loop stopped");
            }
            ReadExit::Lost(reason) => {
                tracing::warn!(
                    connection_id = %connection.id(),
                    reason = %reason,
                    "Gateway read failed"
                );
                self.connection_lost(&connection);
            }
        }
    }

    /// Start recovery if `connection` is still the installed one
    ///
    /// The stop token is installed before this returns, so a `close` issued
    /// at any later point cancels the reconnect. Recovery runs on its own
    /// task so the failing task can exit first.
    fn connection_lost(self: &Arc<Self>, connection: &Arc<Connection>) {
        let stop = {
            let mut state = self.state.write();
            if !state.owns(connection) {
                tracing::debug!(
                    connection_id = %connection.id(),
                    "Connection already replaced, not recovering"
                );
                return;
            }
            if state.recovering(connection) {
                tracing::debug!(connection_id = %connection.id(), "Recovery already started");
                return;
            }

            let stop = self.lifetime.child_token();
            let recovery = Recovery {
                connection_id: connection.id(),
                stop: stop.clone(),
            };
            if let Some(previous) = state.recovery.replace(recovery) {
                previous.stop.cancel();
            }
            stop
        };

        let inner = Arc::clone(self);
        let connection = Arc::clone(connection);
        tokio::spawn(async move {
            if inner.close_if_current(&connection).await && inner.config.reconnect_on_error {
                inner.reconnect(stop).await;
            }
        });
    }

    async fn close_with_code(&self, code: CloseCode) {
        {
            let _guard = self.lifecycle.lock().await;
            let live = {
                let mut state = self.state.write();
                state.data_ready = false;
                state.live.take()
            };
            if let Some(live) = live {
                self.shutdown(live, code).await;
            }
        }

        self.sink.emit(Event::from_payload(Disconnect)).await;
    }

    /// Close `connection` unless someone else already has
    async fn close_if_current(&self, connection: &Arc<Connection>) -> bool {
        {
            let _guard = self.lifecycle.lock().await;
            let live = {
                let mut state = self.state.write();
                if !state.owns(connection) {
                    return false;
                }
                state.data_ready = false;
                state.live.take()
            };
            if let Some(live) = live {
                self.shutdown(live, CloseCode::Normal).await;
            }
        }

        self.sink.emit(Event::from_payload(Disconnect)).await;
        true
    }

    /// Signal the tasks, send a best-effort close frame, and let the socket go
    async fn shutdown(&self, live: Live, code: CloseCode) {
        live.cancel.cancel();

        tracing::info!(connection_id = %live.connection.id(), code = %code, "Closing gateway connection");

        if let Err(error) = live.connection.close(code).await {
            tracing::warn!(
                connection_id = %live.connection.id(),
                error = %error,
                "Failed to send close frame"
            );
        }

        tokio::time::sleep(self.config.close_grace).await;
    }

    /// Retry `open` with exponential backoff until it succeeds or `stop` fires
    ///
    /// `stop` is checked under the lifecycle lock, so a `close` that has
    /// already run is never followed by a reconnect.
    async fn reconnect(self: &Arc<Self>, stop: CancellationToken) {
        let mut backoff = Backoff::new(self.config.backoff_unit, self.config.backoff_max_units);

        loop {
            let attempt = {
                let _guard = self.lifecycle.lock().await;
                if stop.is_cancelled() {
                    tracing::info!("Reconnect cancelled");
                    return;
                }
                tracing::info!("Trying to reconnect to gateway");
                self.open_locked().await
            };

            match attempt {
                Ok(()) => {
                    tracing::info!("Successfully reconnected to gateway");
                    return;
                }
                Err(GatewayError::AlreadyOpen) => {
                    tracing::debug!("Gateway already reopened");
                    return;
                }
                Err(error) => {
                    tracing::error!(error = %error, "Failed to reconnect to gateway");
                }
            }

            let delay = backoff.next_delay();
            tracing::info!(delay_ms = delay.as_millis(), "Waiting before next reconnect attempt");

            tokio::select! {
                () = stop.cancelled() => {
                    tracing::info!("Reconnect cancelled");
                    return;
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    fn stop_recovery(&self) {
        // Left installed so a second failure of the same connection stays deduplicated
        if let Some(recovery) = &self.state.read().recovery {
            recovery.stop.cancel();
        }
    }
}
