//! Error types for the realtime client

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the socket transport.
///
/// Only failures on a caller-initiated `connect()` reach the caller;
/// errors during automatic reconnection attempts are logged and retried
/// internally. Inbound frames that fail to parse are logged and dropped
/// without closing the connection.
#[derive(Debug, Error)]
pub enum SocketError {
    /// No open signal arrived within the configured handshake window
    #[error("connection timed out after {0:?} waiting for open")]
    ConnectionTimeout(Duration),

    /// The socket closed before opening successfully
    #[error("connection closed before open (code {code:?}): {reason}")]
    ConnectionClosed { code: Option<u16>, reason: String },

    /// Frame could not be encoded or decoded as JSON
    #[error("frame serialization error: {0}")]
    Frame(#[from] serde_json::Error),

    /// Underlying WebSocket failure on an established connection
    #[error("websocket error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// The configured socket endpoint is not a valid URL
    #[error("invalid socket endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result type for socket transport operations
pub type SocketResult<T> = Result<T, SocketError>;

/// Errors surfaced by the polling coordinator.
///
/// Silent background fetches swallow these (stale data stays on screen);
/// user-initiated fetches store the message for the view to display.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level request failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// Result type for polling operations
pub type FetchResult<T> = Result<T, FetchError>;
