//! Test helpers for integration tests
//!
//! Provides an in-process websocket gateway and an event recorder.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use guild_client::{ClientConfig, Event, EventKind, Session};
use parking_lot::Mutex;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::Message;

/// Token every test session authenticates with
pub const TEST_TOKEN: &str = "test-token";

/// Headers the client sent on the websocket upgrade
#[derive(Debug, Clone, Default)]
pub struct UpgradeHeaders {
    pub authorization: Option<String>,
    pub accept_encoding: Option<String>,
}

/// Something the test asks the server to do on the live connection
#[derive(Debug)]
pub enum ServerAction {
    Text(String),
    Binary(Vec<u8>),
    /// Drop the TCP connection without a close frame
    Drop,
}

/// How the test server behaves on every connection
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// First frame sent after the upgrade, if any
    pub greeting: Option<String>,
    /// Read from the socket so pings get answered; `false` leaves the
    /// client's heartbeats unacknowledged
    pub answer_pings: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            greeting: Some(crate::hello(30_000)),
            answer_pings: true,
        }
    }
}

struct Shared {
    options: ServerOptions,
    upgrades: Mutex<Vec<UpgradeHeaders>>,
    /// When each upgrade request arrived, rejected ones included
    attempts: Mutex<Vec<Instant>>,
    /// Upgrades still to be refused with 503
    reject: AtomicUsize,
    connections: AtomicUsize,
    actions: tokio::sync::Mutex<mpsc::UnboundedReceiver<ServerAction>>,
}

/// In-process gateway server
///
/// Sends `greeting` as the first frame of every connection, then forwards
/// [`ServerAction`]s to whichever connection is currently live. Pings are
/// answered by the websocket layer.
pub struct TestGateway {
    pub addr: SocketAddr,
    shared: Arc<Shared>,
    actions: mpsc::UnboundedSender<ServerAction>,
    _handle: JoinHandle<()>,
}

impl TestGateway {
    /// Start a server that greets with a valid hello
    pub async fn start() -> Result<Self> {
        Self::start_with(ServerOptions::default()).await
    }

    /// Start a server with a custom first frame, or none at all
    pub async fn start_with_greeting(greeting: Option<String>) -> Result<Self> {
        Self::start_with(ServerOptions {
            greeting,
            ..ServerOptions::default()
        })
        .await
    }

    pub async fn start_with(options: ServerOptions) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;
        let (actions, receiver) = mpsc::unbounded_channel();

        let shared = Arc::new(Shared {
            options,
            upgrades: Mutex::new(Vec::new()),
            attempts: Mutex::new(Vec::new()),
            reject: AtomicUsize::new(0),
            connections: AtomicUsize::new(0),
            actions: tokio::sync::Mutex::new(receiver),
        });

        let handle = tokio::spawn({
            let shared = Arc::clone(&shared);
            async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve(stream, Arc::clone(&shared)));
                }
            }
        });

        Ok(Self {
            addr,
            shared,
            actions,
            _handle: handle,
        })
    }

    #[must_use]
    pub fn url(&self) -> String {
        format!("ws://{}", self.addr)
    }

    /// Client configuration pointing at this server
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(TEST_TOKEN);
        config.gateway.url = self.url();
        config.gateway.sync_events = true;
        config.gateway.close_grace = Duration::from_millis(10);
        config.gateway.backoff_unit = Duration::from_millis(10);
        config.gateway.handshake_timeout = Duration::from_secs(5);
        config
    }

    pub fn send_text(&self, frame: impl Into<String>) {
        let _ = self.actions.send(ServerAction::Text(frame.into()));
    }

    pub fn send_binary(&self, frame: Vec<u8>) {
        let _ = self.actions.send(ServerAction::Binary(frame));
    }

    pub fn drop_connection(&self) {
        let _ = self.actions.send(ServerAction::Drop);
    }

    /// Refuse the next `count` upgrades with 503 Service Unavailable
    pub fn reject_next(&self, count: usize) {
        self.shared.reject.store(count, Ordering::SeqCst);
    }

    /// Arrival time of every upgrade request so far
    #[must_use]
    pub fn attempts(&self) -> Vec<Instant> {
        self.shared.attempts.lock().clone()
    }

    /// Completed websocket upgrades so far
    #[must_use]
    pub fn connections(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn upgrades(&self) -> Vec<UpgradeHeaders> {
        self.shared.upgrades.lock().clone()
    }
}

async fn serve(stream: TcpStream, shared: Arc<Shared>) {
    let upgrades = Arc::clone(&shared);
    let callback = move |request: &Request, response: Response| -> Result<Response, ErrorResponse> {
        upgrades.attempts.lock().push(Instant::now());
        let refused = upgrades
            .reject
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if refused {
            let mut error = ErrorResponse::new(Some("unavailable".to_string()));
            *error.status_mut() = StatusCode::SERVICE_UNAVAILABLE;
            return Err(error);
        }

        let header = |name: &str| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        upgrades.upgrades.lock().push(UpgradeHeaders {
            authorization: header("authorization"),
            accept_encoding: header("accept-encoding"),
        });
        Ok(response)
    };

    let Ok(mut ws) = tokio_tungstenite::accept_hdr_async(stream, callback).await else {
        return;
    };
    shared.connections.fetch_add(1, Ordering::SeqCst);

    if let Some(greeting) = &shared.options.greeting {
        if ws.send(Message::Text(greeting.clone())).await.is_err() {
            return;
        }
    }

    let answer_pings = shared.options.answer_pings;
    let mut actions = shared.actions.lock().await;
    loop {
        tokio::select! {
            incoming = ws.next(), if answer_pings => match incoming {
                Some(Ok(Message::Close(_)) | Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            action = actions.recv() => {
                let sent = match action {
                    Some(ServerAction::Text(text)) => ws.send(Message::Text(text)).await,
                    Some(ServerAction::Binary(bytes)) => ws.send(Message::Binary(bytes)).await,
                    Some(ServerAction::Drop) | None => break,
                };
                if sent.is_err() {
                    break;
                }
            }
        }
    }
}

/// Records every event a session dispatches
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    /// Register a catch-all recorder on `session`
    #[must_use]
    pub fn attach(session: &Session) -> Self {
        let log = Self::default();
        let events = Arc::clone(&log.events);
        session.add_catch_all(move |event: Event| {
            events.lock().push(event);
            async {}
        });
        log
    }

    #[must_use]
    pub fn count(&self, kind: EventKind) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| event.kind() == kind)
            .count()
    }

    #[must_use]
    pub fn of_kind(&self, kind: EventKind) -> Vec<Event> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.kind() == kind)
            .cloned()
            .collect()
    }

    /// Wait until `kind` has been seen at least `count` times
    pub async fn wait_for(&self, kind: EventKind, count: usize) -> Result<()> {
        wait_until(|| self.count(kind) >= count)
            .await
            .map_err(|_| anyhow::anyhow!("Timed out waiting for {count} x {kind}"))
    }
}

/// Poll `condition` every 10ms for up to 5 seconds
pub async fn wait_until(mut condition: impl FnMut() -> bool) -> Result<()> {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .map_err(|_| anyhow::anyhow!("Timed out"))
}
