//! TTL Cache - An in-process time-to-live key/value cache
//!
//! Shields a slow data source from repeated lookups within a time window and
//! sweeps expired entries in the background. Ships with a small HTTP demo
//! server built on top of the cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod source;
pub mod tasks;

pub use api::AppState;
pub use cache::{Cache, CacheStats};
pub use config::{CacheConfig, Config};
