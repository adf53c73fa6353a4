//! Connection state machine and reconnect policy
//!
//! The transport's retry behavior lives here as plain data so the attempt
//! ceiling and backoff formula are testable without any I/O. Backoff is
//! linear (`attempt × base_delay`) with no jitter and no cap beyond the
//! attempt ceiling; transient and permanent failures are retried
//! identically.

use std::time::Duration;

/// Lifecycle of the single socket connection owned by a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and none pending
    Idle,
    /// A caller-initiated handshake is in flight
    Connecting,
    /// Connection is open; the attempt counter is reset
    Open,
    /// Waiting to retry after an unexpected close; holds the attempt number
    Reconnecting(u32),
    /// The attempt ceiling was reached; no further retries are scheduled
    Failed,
}

impl ConnectionState {
    pub fn is_open(&self) -> bool {
        matches!(self, ConnectionState::Open)
    }

    /// Attempt number to use for the next reconnect, or None once the
    /// ceiling is reached. Counting starts at 1 from any non-reconnecting
    /// state and only a successful open resets it.
    pub fn next_attempt(&self, policy: &ReconnectPolicy) -> Option<u32> {
        let next = match self {
            ConnectionState::Reconnecting(n) => n + 1,
            ConnectionState::Failed => return None,
            _ => 1,
        };
        (next <= policy.max_attempts).then_some(next)
    }
}

/// Fixed-attempt linear backoff policy for socket reconnection
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    /// Retries stop silently after this many consecutive failed attempts
    pub max_attempts: u32,
    /// Delay before attempt n is `n × base_delay`
    pub base_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the given 1-based attempt number
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}
