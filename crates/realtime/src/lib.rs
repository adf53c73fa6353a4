//! Campusline Realtime Client
//!
//! This crate contains the real-time path of the Campusline dashboards:
//! the WebSocket chat transport and the chat-thread polling coordinator.
//! Both feed view state independently; there is deliberately no merge
//! protocol between the two (last response wins).

pub mod cache;
pub mod config;
pub mod error;
pub mod polling;
pub mod socket;

pub use cache::DivisionCache;
pub use config::{ConfigError, RealtimeConfig};
pub use error::{FetchError, FetchResult, SocketError, SocketResult};
pub use polling::{ChatPoller, DivisionDirectory, FilterPatch, PollerOptions, ThreadFilters, ThreadView};
pub use socket::{ConnectionState, ReconnectPolicy, SocketFrame, SocketOptions, SocketTransport};
