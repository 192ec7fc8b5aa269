//! Expiry Sweeper
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::cache::{StatsCollector, Store};

/// Shortest interval the sweeper accepts; `tokio::time::interval` rejects zero.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Runs a single sweep: removes every entry with `expires_at <= now` under
/// the store's write lock and records the run.
///
/// Returns the number of entries removed.
pub async fn sweep_once<V: Clone>(store: &RwLock<Store<V>>, stats: &StatsCollector) -> usize {
    let mut guard = store.write().await;
    let removed = guard.sweep_expired(Utc::now());
    // Recorded while the write lock is held so a concurrent clear cannot
    // land between the removal and the counter update.
    stats.record_sweep(removed);
    removed
}

/// Spawns a background task that sweeps expired entries every `interval`.
///
/// The first sweep happens one full interval after spawning. The task exits
/// when `true` is sent on `shutdown` or when the sender is dropped, at the
/// latest one interval after the signal.
///
/// # Arguments
/// * `store` - Shared entry store
/// * `stats` - Shared counters, receives one `sweep_runs` increment per run
/// * `interval` - Time between sweeps
/// * `shutdown` - Receiver side of the cache's shutdown signal
pub fn spawn_sweeper<V>(
    store: Arc<RwLock<Store<V>>>,
    stats: Arc<StatsCollector>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    let period = interval.max(MIN_INTERVAL);

    tokio::spawn(async move {
        info!("Starting expiry sweeper with interval of {:?}", period);

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = sweep_once(&store, &stats).await;
                    if removed > 0 {
                        info!("Expiry sweep: removed {} expired entries", removed);
                    } else {
                        debug!("Expiry sweep: no expired entries found");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Expiry sweeper stopped");
    })
}
