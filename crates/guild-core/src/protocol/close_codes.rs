//! WebSocket close codes
//!
//! Codes the client sends when it closes the gateway connection.

use serde::{Deserialize, Serialize};

/// Client close codes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// Normal closure
    #[default]
    Normal = 1000,
    /// Client is going away (shutdown or reconnect)
    GoingAway = 1001,
    /// Protocol error detected
    ProtocolError = 1002,
    /// Received data the client cannot accept
    UnsupportedData = 1003,
    /// Message violated a policy
    PolicyViolation = 1008,
    /// Unexpected condition on the client
    InternalError = 1011,
}

impl CloseCode {
    /// Create a `CloseCode` from a raw u16 value
    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1000 => Some(Self::Normal),
            1001 => Some(Self::GoingAway),
            1002 => Some(Self::ProtocolError),
            1003 => Some(Self::UnsupportedData),
            1008 => Some(Self::PolicyViolation),
            1011 => Some(Self::InternalError),
            _ => None,
        }
    }

    /// Get the raw u16 value
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Get a human-readable description
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Normal => "Normal closure",
            Self::GoingAway => "Going away",
            Self::ProtocolError => "Protocol error",
            Self::UnsupportedData => "Unsupported data",
            Self::PolicyViolation => "Policy violation",
            Self::InternalError => "Internal error",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_u16())
    }
}
