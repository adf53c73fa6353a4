//! Real-time chat socket
//!
//! One WebSocket connection per authenticated session:
//! - **Frames**: the tagged JSON message union exchanged with the backend
//! - **State**: explicit connection state machine and reconnect policy
//! - **Transport**: the connection owner exposing a minimal send/receive
//!   surface with fixed-attempt linear-backoff reconnection

pub mod frames;
pub mod state;
pub mod transport;

pub use frames::SocketFrame;
pub use state::{ConnectionState, ReconnectPolicy};
pub use transport::{SocketOptions, SocketTransport};
