//! Gateway operation codes
//!
//! Defines the op codes found in the `op` field of inbound gateway frames.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Gateway operation codes
///
/// Only `Hello` is special-cased by the client. Every other value, including
/// codes this crate does not know about, travels the normal type-tag dispatch
/// path, so decoding never fails on an unfamiliar op code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    /// Server dispatches an event to the client
    Dispatch,
    /// Hello - sent once on connect, carries the heartbeat interval
    Hello,
    /// Resume - server replays missed events after a reconnect
    Resume,
    /// Any op code not listed above
    Other(u8),
}

impl OpCode {
    /// Create an `OpCode` from a raw integer value
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Dispatch,
            1 => Self::Hello,
            2 => Self::Resume,
            other => Self::Other(other),
        }
    }

    /// Get the raw integer value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Dispatch => 0,
            Self::Hello => 1,
            Self::Resume => 2,
            Self::Other(value) => value,
        }
    }

    /// Check if this is the handshake op code
    #[must_use]
    pub const fn is_hello(self) -> bool {
        matches!(self, Self::Hello)
    }

    /// Get the name of this op code
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Dispatch => "Dispatch",
            Self::Hello => "Hello",
            Self::Resume => "Resume",
            Self::Other(_) => "Other",
        }
    }
}

impl Serialize for OpCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for OpCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Ok(Self::from_u8(value))
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_u8())
    }
}
