//! Cache Store Module
//!
//! HashMap-backed entry storage with TTL-aware lookups. The store does no
//! locking or bookkeeping of its own; the `Cache` facade wraps it in an
//! `RwLock` and records statistics around each call.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::CacheEntry;

/// Outcome of a store lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// Live entry; carries a copy of the stored value
    Hit(V),
    /// Entry present but logically expired, not yet removed
    Expired,
    /// No entry under this key
    Absent,
}

// == Store ==
/// Mapping from key to entry. Keys are unique and unordered.
#[derive(Debug)]
pub struct Store<V> {
    entries: HashMap<String, CacheEntry<V>>,
}

impl<V> Default for Store<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<V: Clone> Store<V> {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Set ==
    /// Inserts or replaces the entry for `key`, expiring `ttl` from now.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Lifetime of the entry; zero stores an already expired entry
    pub fn set(&mut self, key: String, value: V, ttl: Duration) {
        self.entries.insert(key, CacheEntry::new(value, ttl));
    }

    // == Get ==
    /// Looks up `key` as of `now`. Expired entries are reported but left in place.
    ///
    /// # Arguments
    /// * `key` - The key to retrieve
    /// * `now` - Instant the expiry check is made against
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Lookup<V> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired_at(now) => Lookup::Expired,
            Some(entry) => Lookup::Hit(entry.value.clone()),
            None => Lookup::Absent,
        }
    }

    // == Has ==
    /// True iff `key` is present and not expired as of `now`.
    pub fn has(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired_at(now))
    }

    // == Delete ==
    /// Removes `key`, returning whether an entry was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Removes `key` only if its entry is still expired as of `now`.
    ///
    /// Used by lazy removal so that a fresh `set` racing in after the expired
    /// lookup survives.
    pub fn remove_if_expired(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired_at(now) => self.entries.remove(key).is_some(),
            _ => false,
        }
    }

    // == Sweep ==
    /// Removes every entry with `expires_at <= now`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    // == Clear ==
    /// Drops all entries, returning how many were stored.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    // == Length ==
    /// Raw entry count, including expired entries not yet removed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of all stored keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    /// Iterates over all stored entries, expired ones included.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &CacheEntry<V>)> {
        self.entries.iter()
    }
}
