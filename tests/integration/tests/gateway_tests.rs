//! Gateway integration tests
//!
//! Run against an in-process websocket server, no network access needed.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use std::sync::Arc;
use std::time::Duration;

use guild_client::{EventKind, GatewayError, Session};
use guild_core::events::{ChatMessageCreated, TeamMemberJoined};
use guild_core::Envelope;
use integration_tests::{
    chat_message, compress, dispatch, hello, wait_until, EventLog, ServerOptions, TestGateway,
    TEST_TOKEN,
};
use parking_lot::Mutex;

async fn open_session(server: &TestGateway) -> (Session, EventLog) {
    let session = Session::from_config(server.config()).expect("Failed to build session");
    let log = EventLog::attach(&session);
    session.open().await.expect("Failed to open session");
    log.wait_for(EventKind::Connect, 1).await.unwrap();
    (session, log)
}

// ============================================================================
// Handshake Tests
// ============================================================================

#[tokio::test]
async fn test_open_sends_auth_and_compression_headers() {
    let server = TestGateway::start().await.unwrap();
    let (session, log) = open_session(&server).await;

    assert!(session.gateway().is_open());
    assert_eq!(log.count(EventKind::Connect), 1);

    let upgrades = server.upgrades();
    assert_eq!(upgrades.len(), 1);
    assert_eq!(
        upgrades[0].authorization.as_deref(),
        Some(format!("Bearer {TEST_TOKEN}").as_str())
    );
    assert_eq!(upgrades[0].accept_encoding.as_deref(), Some("zlib"));

    session.close().await;
}

#[tokio::test]
async fn test_open_twice_is_already_open() {
    let server = TestGateway::start().await.unwrap();
    let (session, _log) = open_session(&server).await;

    let error = session.open().await.unwrap_err();
    assert!(matches!(error, GatewayError::AlreadyOpen));
    assert_eq!(server.connections(), 1);

    session.close().await;
}

#[tokio::test]
async fn test_wrong_first_frame_leaves_no_state() {
    let greeting = chat_message("m-1", "too early");
    let server = TestGateway::start_with_greeting(Some(greeting)).await.unwrap();
    let session = Session::from_config(server.config()).unwrap();
    let log = EventLog::attach(&session);

    let error = session.open().await.unwrap_err();
    assert!(matches!(error, GatewayError::UnexpectedOpCode(_)), "got {error:?}");
    assert!(!session.gateway().is_open());
    assert!(session.gateway().connection_id().is_none());

    // Nothing was installed, so a second attempt handshakes again
    let error = session.open().await.unwrap_err();
    assert!(!matches!(error, GatewayError::AlreadyOpen));
    assert_eq!(server.connections(), 2);
    assert_eq!(log.count(EventKind::Connect), 0);
}

#[tokio::test]
async fn test_malformed_hello_fails_open() {
    let greeting = r#"{"op":1,"d":{"unexpected":true}}"#.to_string();
    let server = TestGateway::start_with_greeting(Some(greeting)).await.unwrap();
    let session = Session::from_config(server.config()).unwrap();

    let error = session.open().await.unwrap_err();
    assert!(matches!(error, GatewayError::Handshake(_)), "got {error:?}");
    assert!(!session.gateway().is_open());
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let server = TestGateway::start_with_greeting(None).await.unwrap();
    let mut config = server.config();
    config.gateway.handshake_timeout = Duration::from_millis(200);
    let session = Session::from_config(config).unwrap();

    let error = session.open().await.unwrap_err();
    assert!(matches!(error, GatewayError::HandshakeTimeout(_)), "got {error:?}");
    assert!(!session.gateway().is_open());
}

// ============================================================================
// Close Tests
// ============================================================================

#[tokio::test]
async fn test_double_close_emits_two_disconnects() {
    let server = TestGateway::start().await.unwrap();
    let (session, log) = open_session(&server).await;

    session.close().await;
    assert!(!session.gateway().is_open());
    assert_eq!(log.count(EventKind::Disconnect), 1);

    session.close().await;
    assert!(!session.gateway().is_open());
    assert_eq!(log.count(EventKind::Disconnect), 2);
    assert_eq!(server.connections(), 1);
}

#[tokio::test]
async fn test_reopen_after_close() {
    let server = TestGateway::start().await.unwrap();
    let (session, log) = open_session(&server).await;

    session.close().await;
    session.open().await.unwrap();
    log.wait_for(EventKind::Connect, 2).await.unwrap();

    assert!(session.gateway().is_open());
    assert_eq!(server.connections(), 2);

    session.close().await;
}

// ============================================================================
// Dispatch Tests
// ============================================================================

#[tokio::test]
async fn test_dispatch_in_registration_order() {
    let server = TestGateway::start().await.unwrap();
    let session = Session::from_config(server.config()).unwrap();

    let order = Arc::new(Mutex::new(Vec::new()));
    for index in 0..3 {
        let order = Arc::clone(&order);
        session.add_handler(move |event: Arc<ChatMessageCreated>| {
            order.lock().push((index, event.message.content.clone()));
            async {}
        });
    }
    let joined = Arc::new(Mutex::new(0));
    {
        let joined = Arc::clone(&joined);
        session.add_handler(move |_: Arc<TeamMemberJoined>| {
            *joined.lock() += 1;
            async {}
        });
    }

    session.open().await.unwrap();
    server.send_text(chat_message("m-1", "hello"));

    wait_until(|| order.lock().len() >= 3).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(
        *order.lock(),
        vec![
            (0, "hello".to_string()),
            (1, "hello".to_string()),
            (2, "hello".to_string())
        ]
    );
    assert_eq!(*joined.lock(), 0);

    session.close().await;
}

#[tokio::test]
async fn test_once_handler_fires_once() {
    let server = TestGateway::start().await.unwrap();
    let session = Session::from_config(server.config()).unwrap();
    let log = EventLog::attach(&session);

    let hits = Arc::new(Mutex::new(0));
    {
        let hits = Arc::clone(&hits);
        session.add_handler_once(move |_: Arc<ChatMessageCreated>| {
            *hits.lock() += 1;
            async {}
        });
    }

    session.open().await.unwrap();
    server.send_text(chat_message("m-1", "one"));
    server.send_text(chat_message("m-2", "two"));
    log.wait_for(EventKind::ChatMessageCreated, 2).await.unwrap();

    assert_eq!(*hits.lock(), 1);

    session.close().await;
}

#[tokio::test]
async fn test_compressed_frame_dispatches_like_plain() {
    let server = TestGateway::start().await.unwrap();
    let session = Session::from_config(server.config()).unwrap();

    let received = Arc::new(Mutex::new(Vec::new()));
    {
        let received = Arc::clone(&received);
        session.add_handler(move |event: Arc<ChatMessageCreated>| {
            received.lock().push(event);
            async {}
        });
    }

    session.open().await.unwrap();
    let frame = chat_message("m-7", "same either way");
    server.send_text(frame.clone());
    server.send_binary(compress(&frame));

    wait_until(|| received.lock().len() >= 2).await.unwrap();

    let received = received.lock();
    assert_eq!(*received[0], *received[1]);
    assert_eq!(received[0].message.content, "same either way");
    drop(received);

    session.close().await;
}

#[tokio::test]
async fn test_unknown_event_reaches_catch_all_as_raw() {
    let server = TestGateway::start().await.unwrap();
    let (session, log) = open_session(&server).await;

    server.send_text(dispatch("SomethingNew", "m-3", &serde_json::json!({"x": 1})));
    log.wait_for(EventKind::Raw, 1).await.unwrap();

    let raw = log.of_kind(EventKind::Raw);
    let envelope = raw[0].payload::<Envelope>().unwrap();
    assert_eq!(envelope.event_type(), "SomethingNew");
    assert_eq!(envelope.s.as_deref(), Some("m-3"));

    session.close().await;
}

#[tokio::test]
async fn test_bad_payload_still_dispatches() {
    let server = TestGateway::start().await.unwrap();
    let (session, log) = open_session(&server).await;

    server.send_text(dispatch(
        "ChatMessageCreated",
        "m-4",
        &serde_json::json!({"message": "not an object"}),
    ));
    server.send_text(chat_message("m-5", "after"));
    log.wait_for(EventKind::ChatMessageCreated, 2).await.unwrap();

    let events = log.of_kind(EventKind::ChatMessageCreated);
    let first = events[0].payload::<ChatMessageCreated>().unwrap();
    assert_eq!(*first, ChatMessageCreated::default());
    let second = events[1].payload::<ChatMessageCreated>().unwrap();
    assert_eq!(second.message.content, "after");

    session.close().await;
}

// ============================================================================
// Recovery Tests
// ============================================================================

#[tokio::test]
async fn test_reconnects_after_server_drop() {
    let server = TestGateway::start().await.unwrap();
    let (session, log) = open_session(&server).await;

    server.drop_connection();

    log.wait_for(EventKind::Disconnect, 1).await.unwrap();
    log.wait_for(EventKind::Connect, 2).await.unwrap();
    wait_until(|| session.gateway().is_open()).await.unwrap();
    assert_eq!(server.connections(), 2);

    // The new connection dispatches normally
    server.send_text(chat_message("m-9", "back"));
    log.wait_for(EventKind::ChatMessageCreated, 1).await.unwrap();

    session.close().await;
    assert!(!session.gateway().is_open());
}

#[tokio::test]
async fn test_no_reconnect_when_disabled() {
    let server = TestGateway::start().await.unwrap();
    let mut config = server.config();
    config.gateway.reconnect_on_error = false;
    let session = Session::from_config(config).unwrap();
    let log = EventLog::attach(&session);
    session.open().await.unwrap();
    log.wait_for(EventKind::Connect, 1).await.unwrap();

    server.drop_connection();
    log.wait_for(EventKind::Disconnect, 1).await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!session.gateway().is_open());
    assert_eq!(server.connections(), 1);
    assert_eq!(log.count(EventKind::Connect), 1);
}

#[tokio::test]
async fn test_reconnect_backs_off_between_failed_attempts() {
    let server = TestGateway::start().await.unwrap();
    let mut config = server.config();
    config.gateway.backoff_unit = Duration::from_millis(50);
    let session = Session::from_config(config).unwrap();
    let log = EventLog::attach(&session);
    session.open().await.unwrap();
    log.wait_for(EventKind::Connect, 1).await.unwrap();

    server.reject_next(3);
    server.drop_connection();

    log.wait_for(EventKind::Connect, 2).await.unwrap();
    assert!(session.gateway().is_open());
    assert_eq!(server.connections(), 2);
    assert_eq!(log.count(EventKind::Disconnect), 1);

    // Initial open, three refused retries, then the one that succeeds
    let attempts = server.attempts();
    assert_eq!(attempts.len(), 5);
    for (pair, units) in attempts[1..].windows(2).zip([1u32, 2, 4]) {
        let gap = pair[1] - pair[0];
        let expected = Duration::from_millis(50) * units;
        assert!(gap >= expected, "waited {gap:?}, expected at least {expected:?}");
    }

    session.close().await;
}

#[tokio::test]
async fn test_reconnect_stops_when_opened_by_hand() {
    let server = TestGateway::start().await.unwrap();
    let mut config = server.config();
    config.gateway.backoff_unit = Duration::from_millis(400);
    let session = Session::from_config(config).unwrap();
    let log = EventLog::attach(&session);
    session.open().await.unwrap();
    log.wait_for(EventKind::Connect, 1).await.unwrap();

    server.reject_next(1);
    server.drop_connection();
    wait_until(|| server.attempts().len() >= 2).await.unwrap();

    // The reconnect loop is now waiting out its first backoff
    session.open().await.unwrap();
    let reopened = session.gateway().connection_id();
    assert!(reopened.is_some());

    tokio::time::sleep(Duration::from_millis(1_000)).await;

    assert!(session.gateway().is_open());
    assert_eq!(session.gateway().connection_id(), reopened);
    assert_eq!(server.attempts().len(), 3);
    assert_eq!(server.connections(), 2);
    assert_eq!(log.count(EventKind::Connect), 2);

    session.close().await;
}

#[tokio::test]
async fn test_unanswered_heartbeats_trigger_reconnect() {
    let server = TestGateway::start_with(ServerOptions {
        greeting: Some(hello(20)),
        answer_pings: false,
    })
    .await
    .unwrap();
    let (session, log) = open_session(&server).await;

    log.wait_for(EventKind::Disconnect, 1).await.unwrap();
    log.wait_for(EventKind::Connect, 2).await.unwrap();
    assert!(server.connections() >= 2);
    assert!(session.gateway().heartbeat_latency().is_none());

    session.close().await;
    assert!(!session.gateway().is_open());
}

#[tokio::test]
async fn test_close_during_recovery_stays_closed() {
    let server = TestGateway::start().await.unwrap();
    let mut config = server.config();
    config.gateway.close_grace = Duration::from_millis(300);
    let session = Session::from_config(config).unwrap();
    let log = EventLog::attach(&session);
    session.open().await.unwrap();
    log.wait_for(EventKind::Connect, 1).await.unwrap();

    server.drop_connection();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Recovery is still inside its close grace period here
    session.close().await;
    assert!(!session.gateway().is_open());

    tokio::time::sleep(Duration::from_millis(800)).await;

    assert!(!session.gateway().is_open());
    assert_eq!(server.connections(), 1);
    assert_eq!(log.count(EventKind::Connect), 1);
    assert_eq!(log.count(EventKind::Disconnect), 2);
}

#[tokio::test]
async fn test_heartbeat_is_acknowledged() {
    let server = TestGateway::start_with_greeting(Some(hello(50))).await.unwrap();
    let (session, _log) = open_session(&server).await;

    wait_until(|| session.gateway().data_ready()).await.unwrap();
    wait_until(|| session.gateway().heartbeat_latency().is_some()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(session.gateway().is_open());
    assert_eq!(server.connections(), 1);

    session.close().await;
    assert!(!session.gateway().data_ready());
}
