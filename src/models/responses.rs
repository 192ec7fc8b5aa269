//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the SET operations (PUT /set, POST /user)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for the DELETE operations
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Whether an entry was actually removed
    pub deleted: bool,
    /// The key that was targeted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a delete response.
    ///
    /// # Arguments
    /// * `key` - The key the delete targeted
    /// * `deleted` - Whether an entry was actually removed
    pub fn new(key: impl Into<String>, deleted: bool) -> Self {
        Self {
            deleted,
            key: key.into(),
        }
    }
}

/// Response body for GET /user
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    /// The user record, from the cache or the data source
    pub data: Value,
    /// True when served from the cache
    pub cached: bool,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Counter snapshot
    pub stats: CacheStats,
    /// Current number of stored entries
    pub size: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from a counter snapshot
    pub fn new(stats: CacheStats, size: usize) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
            size,
        }
    }
}

/// Plain acknowledgement (POST /clear)
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
