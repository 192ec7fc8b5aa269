//! Cache Engine
//!
//! The public cache handle. Composes the entry store, the statistics
//! collector and the background sweeper into one cheaply cloneable value
//! that is passed to every collaborator that needs the cache.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, Lookup, StatsCollector, Store};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::{spawn_deferred, spawn_sweeper};

/// Diagnostic snapshot of the whole cache. Read-only; never used to reload.
#[derive(Debug, Clone, Serialize)]
pub struct CacheExport<V> {
    /// Every stored entry, expired ones included
    pub items: HashMap<String, CacheEntry<V>>,
    pub stats: CacheStats,
    pub size: usize,
}

/// Sweeper ownership and the shutdown signal, shared by all handles.
#[derive(Debug)]
struct Lifecycle {
    shutdown_tx: watch::Sender<bool>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
    shut_down: AtomicBool,
}

// == Cache ==
/// Concurrent TTL cache handle.
///
/// Clones share the same entries, counters and sweeper. Reads (`get`, `has`,
/// `size`, `keys`, `export`) share the store lock; writes (`set`, `delete`,
/// `clear` and sweeps) take it exclusively.
///
/// # Example
/// ```ignore
/// let cache = Cache::new(CacheConfig::new(Duration::from_secs(60), Duration::from_secs(10)));
/// cache.set("user:1", "alice".to_string(), None).await;
/// assert_eq!(cache.get("user:1").await.as_deref(), Some("alice"));
/// cache.shutdown().await;
/// ```
#[derive(Debug)]
pub struct Cache<V> {
    store: Arc<RwLock<Store<V>>>,
    stats: Arc<StatsCollector>,
    config: CacheConfig,
    lifecycle: Arc<Lifecycle>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            stats: Arc::clone(&self.stats),
            config: self.config,
            lifecycle: Arc::clone(&self.lifecycle),
        }
    }
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates an empty cache and starts its sweeper.
    ///
    /// The sweeper stops on `shutdown` or once every handle has been dropped.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn new(config: CacheConfig) -> Self {
        let store = Arc::new(RwLock::new(Store::new()));
        let stats = Arc::new(StatsCollector::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let sweeper = spawn_sweeper(
            Arc::clone(&store),
            Arc::clone(&stats),
            config.cleanup_interval,
            shutdown_rx,
        );

        info!(
            "Cache initialized: default_ttl={:?}, cleanup_interval={:?}",
            config.default_ttl, config.cleanup_interval
        );

        Self {
            store,
            stats,
            config,
            lifecycle: Arc::new(Lifecycle {
                shutdown_tx,
                sweeper: Mutex::new(Some(sweeper)),
                shut_down: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the configuration this cache was built with.
    pub fn config(&self) -> CacheConfig {
        self.config
    }

    // == Get ==
    /// Returns a copy of the value stored under `key`, if present and not expired.
    ///
    /// An expired entry counts as a miss and is queued for removal in the
    /// background; this call never waits on that removal.
    ///
    /// # Arguments
    /// * `key` - The key to look up
    ///
    /// # Returns
    /// The stored value, or `None` on a miss
    pub async fn get(&self, key: &str) -> Option<V> {
        lookup_and_record(&self.store, &self.stats, key).await
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// `ttl` falls back to the configured default. A zero TTL stores an entry
    /// that is already expired: the next `get` misses and the next sweep
    /// removes it.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL (uses the configured default if None)
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let ttl = ttl.unwrap_or(self.config.default_ttl);

        let mut store = self.store.write().await;
        debug!("Set {} (ttl {:?})", key, ttl);
        store.set(key, value, ttl);
        self.stats.record_set();
    }

    // == Delete ==
    /// Removes an entry by key.
    ///
    /// Only an actual removal counts towards `deletes`.
    ///
    /// # Arguments
    /// * `key` - The key to delete
    ///
    /// # Returns
    /// `true` if an entry was removed
    pub async fn delete(&self, key: &str) -> bool {
        let mut store = self.store.write().await;
        let removed = store.delete(key);
        if removed {
            self.stats.record_delete();
            debug!("Deleted {}", key);
        }
        removed
    }

    // == Clear ==
    /// Removes every entry and zeroes every counter in one exclusive section.
    pub async fn clear(&self) {
        let mut store = self.store.write().await;
        let removed = store.clear();
        self.stats.reset();
        info!("Cache cleared: {} entries removed", removed);
    }

    /// Checks whether `key` holds a live entry.
    ///
    /// Unlike `get`, this touches no counters and never schedules removal.
    ///
    /// # Arguments
    /// * `key` - The key to check
    pub async fn has(&self, key: &str) -> bool {
        self.store.read().await.has(key, Utc::now())
    }

    /// Raw number of stored entries.
    ///
    /// Expired entries still count until a lazy removal or a sweep drops them.
    pub async fn size(&self) -> usize {
        self.store.read().await.len()
    }

    /// All stored keys, including expired ones not yet removed. Unordered.
    pub async fn keys(&self) -> Vec<String> {
        self.store.read().await.keys()
    }

    // == Get Or Set ==
    /// Returns the live value under `key`, or stores and returns `default`.
    ///
    /// Not atomic: two callers racing on an absent key may both store their
    /// default, and the later write wins.
    pub async fn get_or_set(&self, key: &str, default: V, ttl: Option<Duration>) -> V {
        if let Some(value) = self.get(key).await {
            return value;
        }

        self.set(key, default.clone(), ttl).await;
        default
    }

    // == Set With Expire Callback ==
    /// Stores `value` for `ttl`, then calls `on_expire(key, value)` once the
    /// TTL has elapsed if the key is absent at that point.
    ///
    /// The check is a regular `get`, so it counts as a hit or a miss. If the
    /// key was re-set in the meantime the callback is skipped. Best-effort:
    /// the callback runs on a background task with no ordering guarantee.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store; a copy is handed to `on_expire`
    /// * `ttl` - Lifetime of the entry and delay before the check
    /// * `on_expire` - Called with the key and value if the entry is gone
    pub async fn set_with_expire_callback<F>(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: Duration,
        on_expire: F,
    ) where
        F: FnOnce(String, V) + Send + 'static,
    {
        let key = key.into();
        self.set(key.clone(), value.clone(), Some(ttl)).await;

        // Must not capture the lifecycle, or the sweeper outlives every handle.
        let store = Arc::clone(&self.store);
        let stats = Arc::clone(&self.stats);
        spawn_deferred("expire_callback", async move {
            tokio::time::sleep(ttl).await;
            if lookup_and_record(&store, &stats, &key).await.is_none() {
                debug!("Running expire callback for {}", key);
                on_expire(key, value);
            }
        });
    }

    /// Consistent snapshot of all counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    // == Shutdown ==
    /// Stops the sweeper, waits for it to exit and clears all entries.
    ///
    /// Only the first call does anything; later calls return immediately.
    /// Operations on a shut-down cache still work on the in-memory store but
    /// nothing sweeps it anymore.
    pub async fn shutdown(&self) {
        if self.lifecycle.shut_down.swap(true, Ordering::SeqCst) {
            debug!("Cache already shut down");
            return;
        }

        // The sweeper may already be gone; a closed channel is fine.
        let _ = self.lifecycle.shutdown_tx.send(true);

        let sweeper = self
            .lifecycle
            .sweeper
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = sweeper {
            if let Err(err) = handle.await {
                warn!("Sweeper task ended abnormally: {}", err);
            }
        }

        self.clear().await;
        info!("Cache shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.lifecycle.shut_down.load(Ordering::SeqCst)
    }
}

impl<V> Cache<V>
where
    V: Clone + Send + Sync + Serialize + 'static,
{
    // == Export ==
    /// Copies every entry plus the current counters for diagnostics.
    pub async fn export(&self) -> CacheExport<V> {
        let store = self.store.read().await;
        let items: HashMap<String, CacheEntry<V>> = store
            .iter()
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect();

        CacheExport {
            size: items.len(),
            stats: self.stats.snapshot(),
            items,
        }
    }

    /// Pretty-printed JSON form of [`Cache::export`].
    pub async fn export_json(&self) -> Result<String> {
        let export = self.export().await;
        Ok(serde_json::to_string_pretty(&export)?)
    }
}

/// Read path shared by `Cache::get` and the expire-callback check.
async fn lookup_and_record<V>(
    store: &Arc<RwLock<Store<V>>>,
    stats: &Arc<StatsCollector>,
    key: &str,
) -> Option<V>
where
    V: Clone + Send + Sync + 'static,
{
    let lookup = {
        let guard = store.read().await;
        let lookup = guard.get(key, Utc::now());
        match &lookup {
            Lookup::Hit(_) => stats.record_hit(),
            Lookup::Expired | Lookup::Absent => stats.record_miss(),
        }
        lookup
    };

    match lookup {
        Lookup::Hit(value) => Some(value),
        Lookup::Expired => {
            remove_expired_later(Arc::clone(store), Arc::clone(stats), key.to_string());
            None
        }
        Lookup::Absent => None,
    }
}

fn remove_expired_later<V>(store: Arc<RwLock<Store<V>>>, stats: Arc<StatsCollector>, key: String)
where
    V: Clone + Send + Sync + 'static,
{
    spawn_deferred("lazy_remove", async move {
        let mut guard = store.write().await;
        if guard.remove_if_expired(&key, Utc::now()) {
            stats.record_delete();
            debug!("Removed expired entry on access: {}", key);
        }
    });
}
