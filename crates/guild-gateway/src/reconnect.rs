//! Reconnection backoff
//!
//! The wait after the k-th consecutive failed attempt is
//! `min(2^(k-1), max_units)` units. Each reconnect sequence starts a fresh
//! `Backoff`, so a successful reconnect resets it.

use std::time::Duration;

/// Exponential backoff between reconnect attempts
#[derive(Debug, Clone)]
pub struct Backoff {
    unit: Duration,
    max_units: u32,
    current_units: u32,
}

impl Backoff {
    /// Create a backoff starting at one `unit`, capped at `max_units`
    #[must_use]
    pub fn new(unit: Duration, max_units: u32) -> Self {
        Self {
            unit,
            max_units: max_units.max(1),
            current_units: 1,
        }
    }

    /// The next wait, advancing the sequence
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.unit * self.current_units;
        self.current_units = self.current_units.saturating_mul(2).min(self.max_units);
        delay
    }
}
