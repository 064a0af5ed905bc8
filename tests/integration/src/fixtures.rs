//! Gateway frame fixtures

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// Hello frame advertising `interval_ms`
#[must_use]
pub fn hello(interval_ms: u64) -> String {
    serde_json::json!({
        "op": 1,
        "d": {"heartbeatIntervalMs": interval_ms, "lastMessageId": "m-0"}
    })
    .to_string()
}

/// Dispatch frame with type tag `t` and payload `d`
#[must_use]
pub fn dispatch(t: &str, message_id: &str, d: &serde_json::Value) -> String {
    serde_json::json!({"op": 0, "s": message_id, "t": t, "d": d}).to_string()
}

/// A `ChatMessageCreated` dispatch frame
#[must_use]
pub fn chat_message(message_id: &str, content: &str) -> String {
    dispatch(
        "ChatMessageCreated",
        message_id,
        &serde_json::json!({
            "serverId": "s1",
            "message": {
                "id": message_id,
                "type": "default",
                "serverId": "s1",
                "channelId": "c1",
                "content": content,
                "createdBy": "u1"
            }
        }),
    )
}

/// zlib-compress a frame the way the server does for binary frames
#[must_use]
pub fn compress(frame: &str) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(frame.as_bytes())
        .expect("writing to a Vec cannot fail");
    encoder.finish().expect("writing to a Vec cannot fail")
}
