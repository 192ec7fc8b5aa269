//! Deferred Work
//!
//! Fire-and-forget units of work submitted by the cache. Nothing awaits them
//! and no ordering is guaranteed relative to later calls on the same key.

use std::future::Future;

use tokio::task::JoinHandle;
use tracing::{debug_span, trace, warn, Instrument};

/// Spawns `work` onto the current tokio runtime without waiting for it.
///
/// The work runs on its own task, watched by a second task that logs a
/// `warn!` if it panics or is cancelled. The returned handle belongs to the
/// watcher and may be dropped; both keep running detached.
///
/// # Arguments
/// * `label` - Name recorded on the span and on failure events
/// * `work` - The future to run
///
/// # Panics
/// Panics if called outside of a tokio runtime, like `tokio::spawn`.
pub fn spawn_deferred<F>(label: &'static str, work: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let span = debug_span!("deferred", task = label);
    let task = tokio::spawn(work.instrument(span.clone()));

    tokio::spawn(
        async move {
            match task.await {
                Ok(()) => trace!("deferred work finished"),
                Err(err) => warn!(task = label, "deferred work failed: {}", err),
            }
        }
        .instrument(span),
    )
}
