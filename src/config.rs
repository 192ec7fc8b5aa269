//! Configuration Module
//!
//! Handles loading server configuration from environment variables and
//! deriving the cache construction parameters from it.

use std::env;
use std::time::Duration;

/// Parameters the cache engine is built with.
///
/// Both values are required and fixed for the lifetime of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL applied when `set` is called without an explicit TTL
    pub default_ttl: Duration,
    /// Interval between background sweeps
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Creates a cache configuration.
    pub fn new(default_ttl: Duration, cleanup_interval: Duration) -> Self {
        Self {
            default_ttl,
            cleanup_interval,
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Whether to populate the cache with demo entries at startup
    pub seed_demo_data: bool,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 60)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 10)
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `SEED_DEMO_DATA` - Seed demo entries at startup (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            cleanup_interval: parse_var::<u64>("CLEANUP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            seed_demo_data: parse_var("SEED_DEMO_DATA").unwrap_or(defaults.seed_demo_data),
        }
    }

    /// Returns the cache construction parameters.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(
            Duration::from_secs(self.default_ttl),
            Duration::from_secs(self.cleanup_interval),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 60,
            cleanup_interval: 10,
            server_port: 8080,
            seed_demo_data: true,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
