//! REST integration tests
//!
//! Run with: cargo test -p integration-tests --test rest_tests

use std::sync::Arc;
use std::time::Duration;

use guild_client::{ClientConfig, Method, RestError, Session};
use guild_core::events::RateLimit;
use parking_lot::Mutex;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session(server: &MockServer, retry_on_rate_limit: bool) -> Session {
    let mut config = ClientConfig::new("test-token");
    config.rest.api_base = format!("{}/", server.uri());
    config.rest.retry_after_unit = Duration::from_millis(20);
    config.rest.retry_on_rate_limit = retry_on_rate_limit;
    config.gateway.sync_events = true;
    Session::from_config(config).unwrap()
}

#[tokio::test]
async fn test_rate_limit_event_reaches_session_handlers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/channels/c1/messages"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/channels/c1/messages"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "message": {"id": "m1", "channelId": "c1", "content": "pong"}
        })))
        .mount(&server)
        .await;

    let session = session(&server, true);
    let limits = Arc::new(Mutex::new(Vec::new()));
    {
        let limits = Arc::clone(&limits);
        session.add_handler(move |event: Arc<RateLimit>| {
            limits.lock().push(event);
            async {}
        });
    }

    let message = session
        .rest()
        .channel_message_create("c1", "pong")
        .await
        .unwrap();

    assert_eq!(message.id, "m1");
    let limits = limits.lock();
    assert_eq!(limits.len(), 1);
    assert_eq!(limits[0].retry_after, Duration::from_millis(40));
    assert_eq!(limits[0].url, format!("{}/channels/c1/messages", server.uri()));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_rate_limit_surfaces_when_retry_disabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2"))
        .mount(&server)
        .await;

    let session = session(&server, false);
    let url = format!("{}/channels/c1", server.uri());
    let error = session
        .request::<()>(Method::GET, &url, None)
        .await
        .unwrap_err();

    match error {
        RestError::RateLimited(limit) => {
            assert_eq!(limit.retry_after, Duration::from_millis(40));
            assert_eq!(limit.url, url);
        }
        other => panic!("expected rate limit error, got {other:?}"),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_retries_exceeded_after_max_plus_one_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let session = session(&server, true);
    let error = session.rest().channel_get("c1").await.unwrap_err();

    assert!(matches!(error, RestError::RetriesExceeded { .. }), "got {error:?}");
    let expected = session.config().rest.max_retries as usize + 1;
    assert_eq!(server.received_requests().await.unwrap().len(), expected);
}
