//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

// == Cache Entry ==
/// A stored value together with its creation and expiration timestamps.
///
/// Entries are never mutated in place; a later `set` on the same key
/// replaces the whole entry.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Insertion timestamp
    pub created_at: DateTime<Utc>,
    /// Timestamp from which the entry is considered expired
    pub expires_at: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry that expires `ttl` after now.
    ///
    /// A zero TTL produces an entry that is already expired.
    pub fn new(value: V, ttl: Duration) -> Self {
        Self::new_at(value, ttl, Utc::now())
    }

    /// Creates an entry as if it had been inserted at `now`.
    pub fn new_at(value: V, ttl: Duration, now: DateTime<Utc>) -> Self {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            value,
            created_at: now,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired relative to `now`.
    ///
    /// Boundary condition: an entry is expired once `now >= expires_at`, so a
    /// lookup made exactly when the TTL elapses is already a miss, and a sweep
    /// at that instant removes it.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation_with_ttl() {
        let entry = CacheEntry::new("test_value", Duration::from_secs(60));

        assert_eq!(entry.value, "test_value");
        assert!(entry.expires_at > entry.created_at);
        assert!(!entry.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new("test_value", Duration::from_millis(50));

        assert!(!entry.is_expired_at(Utc::now()));

        sleep(Duration::from_millis(80));

        assert!(entry.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let entry = CacheEntry::new(1u32, Duration::ZERO);

        assert_eq!(entry.expires_at, entry.created_at);
        assert!(entry.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Utc::now();
        let entry = CacheEntry::new_at("test", Duration::from_secs(1), now);

        let one_sec = TimeDelta::seconds(1);
        assert!(!entry.is_expired_at(now));
        assert!(!entry.is_expired_at(now + one_sec - TimeDelta::milliseconds(1)));
        assert!(entry.is_expired_at(now + one_sec), "Entry should be expired at boundary");
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = CacheEntry::new("forever", Duration::MAX);

        assert_eq!(entry.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(!entry.is_expired_at(Utc::now()));
    }
}
