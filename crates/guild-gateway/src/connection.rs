//! Gateway connection
//!
//! Wraps the write half of one websocket. All writes go through a single
//! async mutex so heartbeat probes and close frames never interleave.

use crate::decoder::{Frame, FrameDecoder};
use crate::error::{GatewayError, GatewayResult};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use guild_core::{CloseCode, HelloPayload};
use std::fmt;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header, HeaderValue};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

pub(crate) type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Read half of a gateway connection
pub(crate) type WsSource = SplitStream<WsStream>;

/// Write half of one gateway websocket
pub struct Connection {
    /// Unique connection ID, for logs
    id: Uuid,

    sink: Mutex<SplitSink<WsStream, Message>>,
}

impl Connection {
    /// Dial the gateway
    ///
    /// Sends `Authorization: Bearer <token>` and advertises zlib support.
    pub(crate) async fn connect(url: &str, token: &str) -> GatewayResult<(Arc<Self>, WsSource)> {
        let mut request = url.into_client_request()?;
        let headers = request.headers_mut();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))?,
        );
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("zlib"));

        let (stream, _response) = tokio_tungstenite::connect_async(request).await?;
        let (sink, source) = stream.split();

        let connection = Arc::new(Self {
            id: Uuid::new_v4(),
            sink: Mutex::new(sink),
        });

        tracing::debug!(connection_id = %connection.id, url = %url, "Websocket connected");

        Ok((connection, source))
    }

    /// Get the connection ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Send one message
    pub(crate) async fn send(&self, message: Message) -> Result<(), tungstenite::Error> {
        self.sink.lock().await.send(message).await
    }

    /// Send a heartbeat probe
    pub(crate) async fn ping(&self) -> Result<(), tungstenite::Error> {
        self.send(Message::Ping(Vec::new())).await
    }

    /// Send a close frame
    pub(crate) async fn close(&self, code: CloseCode) -> Result<(), tungstenite::Error> {
        self.send(Message::Close(Some(CloseFrame {
            code: WsCloseCode::from(code.as_u16()),
            reason: code.description().into(),
        })))
        .await
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Read the hello frame that must open every connection
pub(crate) async fn await_hello(
    decoder: &FrameDecoder,
    source: &mut WsSource,
) -> GatewayResult<HelloPayload> {
    let message = source
        .next()
        .await
        .ok_or_else(|| GatewayError::Handshake("connection closed before hello".to_string()))??;

    let envelope = match decoder.classify(message)? {
        Frame::Envelope(envelope) => envelope,
        Frame::Close(frame) => {
            return Err(GatewayError::Handshake(format!(
                "server closed the connection: {frame:?}"
            )))
        }
        Frame::Ack | Frame::Ignore => {
            return Err(GatewayError::Handshake(
                "expected hello, got a control frame".to_string(),
            ))
        }
    };

    match envelope.as_hello() {
        Some(Ok(hello)) => Ok(hello),
        Some(Err(error)) => Err(GatewayError::Handshake(format!("malformed hello: {error}"))),
        None => Err(GatewayError::UnexpectedOpCode(envelope.op)),
    }
}
