//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// Default TTL in seconds for cache entries without explicit TTL
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background TTL cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Base URL of the chain bridge service
    pub chain_url: String,
    /// Timeout in seconds applied to every chain call
    pub chain_timeout: u64,
    /// Free-wash coupon expiry sweep interval in seconds (0 disables the sweep)
    pub coupon_sweep_interval: u64,
    /// Grace period in seconds for background tasks during shutdown
    pub shutdown_grace: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 10000)
    /// - `DEFAULT_TTL` - Default cache TTL in seconds (default: 600)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cache cleanup frequency in seconds (default: 30)
    /// - `CHAIN_URL` - Chain bridge base URL (default: http://127.0.0.1:8545)
    /// - `CHAIN_TIMEOUT` - Chain call timeout in seconds (default: 10)
    /// - `COUPON_SWEEP_INTERVAL` - Coupon expiry sweep in seconds (default: 300, 0 disables)
    /// - `SHUTDOWN_GRACE` - Shutdown grace period in seconds (default: 10)
    pub fn from_env() -> Self {
        Self {
            max_entries: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            default_ttl: env::var("DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(600),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            chain_url: env::var("CHAIN_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8545".to_string()),
            chain_timeout: env::var("CHAIN_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            coupon_sweep_interval: env::var("COUPON_SWEEP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            shutdown_grace: env::var("SHUTDOWN_GRACE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }

    /// Chain call timeout as a Duration.
    pub fn chain_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.chain_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            default_ttl: 600,
            server_port: 3000,
            cleanup_interval: 30,
            chain_url: "http://127.0.0.1:8545".to_string(),
            chain_timeout: 10,
            coupon_sweep_interval: 300,
            shutdown_grace: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_entries, 10_000);
        assert_eq!(config.default_ttl, 600);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 30);
        assert_eq!(config.chain_url, "http://127.0.0.1:8545");
        assert_eq!(config.chain_timeout, 10);
        assert_eq!(config.coupon_sweep_interval, 300);
    }

    #[test]
    fn test_chain_timeout_duration() {
        let config = Config::default();
        assert_eq!(config.chain_timeout_duration(), Duration::from_secs(10));
    }
}
