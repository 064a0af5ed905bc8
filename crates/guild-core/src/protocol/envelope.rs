//! Gateway envelope format
//!
//! Defines the outer structure shared by every inbound gateway frame.

use super::{HelloPayload, OpCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Gateway envelope
///
/// Wire shape `{op, s, t, d}`. The payload `d` is kept undecoded until the
/// type tag has been looked up in the event registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Operation code
    pub op: OpCode,

    /// Message identifier, used to resume after a reconnect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<String>,

    /// Event type tag (dispatch frames only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Raw event data payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl Envelope {
    /// Create a Dispatch envelope (op=0)
    #[must_use]
    pub fn dispatch(event_type: impl Into<String>, message_id: impl Into<String>, data: Value) -> Self {
        Self {
            op: OpCode::Dispatch,
            s: Some(message_id.into()),
            t: Some(event_type.into()),
            d: Some(data),
        }
    }

    /// Create a Hello envelope (op=1)
    #[must_use]
    pub fn hello(payload: &HelloPayload) -> Self {
        Self {
            op: OpCode::Hello,
            s: None,
            t: None,
            d: Some(serde_json::to_value(payload).unwrap_or_default()),
        }
    }

    /// Try to parse the Hello payload (op=1)
    ///
    /// Returns `None` for any other op code.
    pub fn as_hello(&self) -> Option<Result<HelloPayload, serde_json::Error>> {
        if !self.op.is_hello() {
            return None;
        }
        let data = self.d.as_ref().unwrap_or(&Value::Null);
        Some(HelloPayload::deserialize(data))
    }

    /// The type tag, or an empty string for untagged frames
    #[must_use]
    pub fn event_type(&self) -> &str {
        self.t.as_deref().unwrap_or_default()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from raw JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(t) = &self.t {
            write!(f, "Envelope(op={}, t={}", self.op, t)?;
            if let Some(s) = &self.s {
                write!(f, ", s={s}")?;
            }
            write!(f, ")")
        } else {
            write!(f, "Envelope(op={})", self.op)
        }
    }
}
