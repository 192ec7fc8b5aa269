//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl`: Optional TTL in seconds (uses default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} characters",
                MAX_KEY_LENGTH
            ));
        }
        None
    }
}

/// Query string of the `/user` endpoints (`?id=123`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserQuery {
    pub id: Option<String>,
}

impl UserQuery {
    /// Parses the user id, or explains why it is unusable.
    pub fn user_id(&self) -> Result<u64, String> {
        let raw = self
            .id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| "User id is required".to_string())?;

        raw.parse()
            .map_err(|_| "User id must be a number".to_string())
    }
}

/// Cache key under which a user record is stored.
pub fn user_cache_key(id: u64) -> String {
    format!("user:{}", id)
}
