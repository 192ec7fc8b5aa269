//! Background Tasks Module
//!
//! Contains the work the cache runs outside of its callers.
//!
//! # Tasks
//! - Sweeper: removes expired entries at the configured interval
//! - Deferred work: fire-and-forget units such as lazy removal and expiry callbacks

mod deferred;
mod sweeper;

pub use deferred::spawn_deferred;
pub use sweeper::{spawn_sweeper, sweep_once};
