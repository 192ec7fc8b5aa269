//! Cache Module
//!
//! Provides the in-process TTL cache: entries, their store, the statistics
//! collector and the `Cache` handle that ties them to the background sweeper.

mod engine;
mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use engine::{Cache, CacheExport};
pub use entry::CacheEntry;
pub use stats::{CacheStats, StatsCollector};
pub use store::{Lookup, Store};
