//! Simulated Data Source
//!
//! Stands in for the slow database the cache shields. Every lookup pays a
//! fixed latency so cache hits are visibly faster than misses.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Latency of one simulated query.
pub const QUERY_LATENCY: Duration = Duration::from_millis(100);

/// A user row as returned by the simulated database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub last_seen: String,
}

/// Fetches the user with `id`, sleeping for [`QUERY_LATENCY`] first.
pub async fn fetch_user(id: u64) -> UserRecord {
    tokio::time::sleep(QUERY_LATENCY).await;

    UserRecord {
        id,
        name: format!("User {}", id),
        email: format!("user{}@example.com", id),
        last_seen: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    }
}
