//! Realtime client configuration

use std::env;
use std::time::Duration;

/// Configuration for the realtime client, loaded from environment variables
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// Base URL of the REST backend, e.g. "https://api.campusline.app"
    pub api_url: String,
    /// WebSocket endpoint for the chat socket, e.g. "wss://api.campusline.app/ws"
    pub socket_url: String,
    /// Interval between silent background thread fetches
    pub poll_interval: Duration,
    /// How long `connect()` waits for the socket to report open
    pub connect_timeout: Duration,
    /// Default thread-list page size
    pub page_size: u32,
    /// Freshness window for the class-division cache
    pub division_cache_ttl: Duration,
}

impl RealtimeConfig {
    /// Load configuration, reading a `.env` file first if one exists
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: env::var("CAMPUSLINE_API_URL")
                .map_err(|_| ConfigError::Missing("CAMPUSLINE_API_URL"))?,
            socket_url: env::var("CAMPUSLINE_WS_URL")
                .map_err(|_| ConfigError::Missing("CAMPUSLINE_WS_URL"))?,
            poll_interval: Duration::from_millis(
                env::var("CAMPUSLINE_POLL_INTERVAL_MS")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .unwrap_or(5000),
            ),
            connect_timeout: Duration::from_millis(
                env::var("CAMPUSLINE_CONNECT_TIMEOUT_MS")
                    .unwrap_or_else(|_| "10000".to_string())
                    .parse()
                    .unwrap_or(10000),
            ),
            page_size: env::var("CAMPUSLINE_PAGE_SIZE")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .unwrap_or(20),
            division_cache_ttl: Duration::from_millis(
                env::var("CAMPUSLINE_DIVISION_CACHE_TTL_MS")
                    .unwrap_or_else(|_| "300000".to_string())
                    .parse()
                    .unwrap_or(300_000),
            ),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
