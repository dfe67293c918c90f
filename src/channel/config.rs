//! Channel endpoint and timeout configuration
//!
//! Defaults target the daemon's loopback endpoint. Environment variables
//! override the defaults; CLI arguments (clap `env` feature) override both.
//!
//! # Environment Variables
//!
//! ```bash
//! SYNC_OVERLAYS_HOST=127.0.0.1
//! SYNC_OVERLAYS_PORT=3782
//! SYNC_OVERLAYS_TIMEOUT_MS=250
//! ```

use std::time::Duration;

/// Default daemon port
pub const DEFAULT_PORT: u16 = 3782;

/// Default daemon host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default bound on a single IPC round trip
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(250);

/// Default bound on connection establishment
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(500);

/// Configuration for the status channel connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Daemon host (loopback in practice)
    pub host: String,
    /// Daemon port
    pub port: u16,
    /// Upper bound on a single request/response round trip
    pub request_timeout: Duration,
    /// Upper bound on connection establishment
    pub connect_timeout: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ChannelConfig {
    /// Defaults with environment variable overrides applied.
    ///
    /// Unparseable values fall back to the default rather than failing:
    /// configuration problems must not take the overlay system down.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("SYNC_OVERLAYS_HOST") {
            if !host.is_empty() {
                config.host = host;
            }
        }
        if let Ok(port) = std::env::var("SYNC_OVERLAYS_PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }
        if let Ok(ms) = std::env::var("SYNC_OVERLAYS_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                config.request_timeout = Duration::from_millis(ms);
            }
        }

        config
    }

    /// WebSocket URL for the daemon endpoint
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }

    /// Copy with a different port (ephemeral ports in tests)
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_url() {
        let config = ChannelConfig::default();
        assert_eq!(config.url(), "ws://127.0.0.1:3782");
    }

    #[test]
    fn test_with_port() {
        let config = ChannelConfig::default().with_port(9999);
        assert_eq!(config.url(), "ws://127.0.0.1:9999");
        assert_eq!(config.host, DEFAULT_HOST);
    }
}
