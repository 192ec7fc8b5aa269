//! Cache Statistics Module
//!
//! Tracks lookup, write and sweep counters and hands out consistent snapshots.

use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

// == Cache Stats ==
/// Point-in-time copy of the cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that found a live entry
    pub hits: u64,
    /// Lookups on an absent or expired key
    pub misses: u64,
    /// Calls to `set`
    pub sets: u64,
    /// Entries removed by `delete`, including lazy removal of expired entries
    pub deletes: u64,
    /// Completed sweeper runs
    pub sweep_runs: u64,
    /// Entries removed by the sweeper
    pub swept_entries: u64,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Collector ==
/// Shared counter set, guarded independently from the entry store.
///
/// Every update and snapshot takes the same short-lived lock, so a snapshot
/// never observes one counter mid-update relative to another.
#[derive(Debug, Default)]
pub struct StatsCollector {
    inner: Mutex<CacheStats>,
}

impl StatsCollector {
    /// Creates a collector with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CacheStats> {
        // Counters stay valid even if a holder panicked mid-increment.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_hit(&self) {
        self.lock().hits += 1;
    }

    pub fn record_miss(&self) {
        self.lock().misses += 1;
    }

    pub fn record_set(&self) {
        self.lock().sets += 1;
    }

    pub fn record_delete(&self) {
        self.lock().deletes += 1;
    }

    /// Records one sweeper run that removed `removed` entries.
    pub fn record_sweep(&self, removed: usize) {
        let mut stats = self.lock();
        stats.sweep_runs += 1;
        stats.swept_entries += removed as u64;
    }

    /// Returns a copy of all counters taken at one instant.
    pub fn snapshot(&self) -> CacheStats {
        *self.lock()
    }

    /// Zeroes every counter.
    pub fn reset(&self) {
        *self.lock() = CacheStats::default();
    }
}
