//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache's counting, overwrite, sweep and
//! concurrency guarantees over generated operation sequences.

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_test::block_on;

use crate::cache::{Cache, StatsCollector, Store};
use crate::config::CacheConfig;
use crate::tasks::sweep_once;

// == Test Configuration ==
const TEST_DEFAULT_TTL: Duration = Duration::from_secs(300);
const TEST_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

fn test_cache() -> Cache<String> {
    Cache::new(CacheConfig::new(TEST_DEFAULT_TTL, TEST_SWEEP_INTERVAL))
}

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}".prop_map(|s| s)
}

/// Generates cache values
fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,64}".prop_map(|s| s)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // *For any* sequence of operations, hits + misses equals the number of
    // gets, sets equals the number of sets, and every result agrees with a
    // plain HashMap model.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        block_on(async {
            let cache = test_cache();
            let mut model: HashMap<String, String> = HashMap::new();
            let (mut gets, mut sets, mut hits, mut deletes) = (0u64, 0u64, 0u64, 0u64);

            for op in ops {
                match op {
                    CacheOp::Set { key, value } => {
                        cache.set(key.clone(), value.clone(), None).await;
                        model.insert(key, value);
                        sets += 1;
                    }
                    CacheOp::Get { key } => {
                        let got = cache.get(&key).await;
                        prop_assert_eq!(got.as_ref(), model.get(&key));
                        gets += 1;
                        if got.is_some() {
                            hits += 1;
                        }
                    }
                    CacheOp::Delete { key } => {
                        let removed = cache.delete(&key).await;
                        prop_assert_eq!(removed, model.remove(&key).is_some());
                        if removed {
                            deletes += 1;
                        }
                    }
                }
            }

            let stats = cache.stats();
            prop_assert_eq!(stats.hits + stats.misses, gets);
            prop_assert_eq!(stats.hits, hits);
            prop_assert_eq!(stats.sets, sets);
            prop_assert_eq!(stats.deletes, deletes);
            prop_assert_eq!(cache.size().await, model.len());

            cache.shutdown().await;
            Ok(())
        })?;
    }

    // *For any* key, a second set replaces the first value and its TTL.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        block_on(async {
            let cache = test_cache();

            cache.set(key.clone(), value1, Some(TEST_DEFAULT_TTL)).await;
            cache.set(key.clone(), value2.clone(), Some(Duration::ZERO)).await;

            // The zero TTL of the second write governs, not the first TTL.
            prop_assert_eq!(cache.get(&key).await, None);

            cache.set(key.clone(), value2.clone(), None).await;
            prop_assert_eq!(cache.get(&key).await, Some(value2));
            prop_assert!(cache.size().await <= 1);

            cache.shutdown().await;
            Ok(())
        })?;
    }

    // *For any* mix of expired and live entries, one sweep removes exactly
    // the expired ones and leaves the live ones untouched.
    #[test]
    fn prop_sweep_completeness(
        entries in prop::collection::hash_map(key_strategy(), any::<bool>(), 1..20)
    ) {
        block_on(async {
            let store = RwLock::new(Store::new());
            let stats = StatsCollector::new();
            {
                let mut guard = store.write().await;
                for (key, expired) in &entries {
                    let ttl = if *expired { Duration::ZERO } else { TEST_DEFAULT_TTL };
                    guard.set(key.clone(), key.clone(), ttl);
                }
            }

            let removed = sweep_once(&store, &stats).await;

            let expected_live: HashSet<String> = entries
                .iter()
                .filter(|(_, expired)| !**expired)
                .map(|(key, _)| key.clone())
                .collect();
            let remaining: HashSet<String> = store.read().await.keys().into_iter().collect();

            prop_assert_eq!(removed, entries.len() - expected_live.len());
            prop_assert_eq!(remaining, expected_live);
            let snapshot = stats.snapshot();
            prop_assert_eq!(snapshot.sweep_runs, 1);
            prop_assert_eq!(snapshot.swept_entries, removed as u64);
            Ok(())
        })?;
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // *For any* entry stored with a TTL, lookups before the TTL elapses hit
    // and lookups after it miss.
    #[test]
    fn prop_ttl_expiration_behavior(
        key in key_strategy(),
        value in value_strategy()
    ) {
        block_on(async {
            let cache = test_cache();

            cache.set(key.clone(), value.clone(), Some(Duration::from_millis(60))).await;
            prop_assert_eq!(cache.get(&key).await, Some(value));

            tokio::time::sleep(Duration::from_millis(90)).await;

            prop_assert_eq!(cache.get(&key).await, None);
            prop_assert!(!cache.has(&key).await);

            cache.shutdown().await;
            Ok(())
        })?;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // *For any* set of distinct keys written and read concurrently, no entry
    // is lost and every counter reflects every call.
    #[test]
    fn prop_concurrent_operation_correctness(
        keys in prop::collection::hash_set("[a-z0-9]{1,12}", 1..100)
    ) {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(4)
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async {
            let cache = test_cache();
            let expected = keys.len();

            let handles: Vec<_> = keys
                .into_iter()
                .map(|key| {
                    let cache = cache.clone();
                    tokio::spawn(async move {
                        let value = format!("value_{}", key);
                        cache.set(key.clone(), value.clone(), None).await;
                        cache.get(&key).await == Some(value)
                    })
                })
                .collect();

            for handle in handles {
                prop_assert!(handle.await.expect("Task should not panic"));
            }

            prop_assert_eq!(cache.size().await, expected);
            let stats = cache.stats();
            prop_assert_eq!(stats.sets, expected as u64);
            prop_assert_eq!(stats.hits, expected as u64);
            prop_assert_eq!(stats.misses, 0);

            cache.shutdown().await;
            Ok(())
        })?;
    }
}

// == Additional Unit Tests for Edge Cases ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concurrent_sets_same_key_last_write_wins() {
        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let cache = test_cache();
            let handles: Vec<_> = (0..50)
                .map(|i| {
                    let cache = cache.clone();
                    tokio::spawn(async move {
                        cache.set("contended", format!("writer_{}", i), None).await;
                    })
                })
                .collect();
            for handle in handles {
                handle.await.unwrap();
            }

            let value = cache.get("contended").await.unwrap();
            assert!(value.starts_with("writer_"));
            assert_eq!(cache.size().await, 1);
            assert_eq!(cache.stats().sets, 50);
        });
    }

    #[test]
    fn test_racing_get_or_set_never_corrupts() {
        let rt = tokio::runtime::Runtime::new().unwrap();

        rt.block_on(async {
            let cache = test_cache();
            let handles: Vec<_> = (0..20)
                .map(|i| {
                    let cache = cache.clone();
                    tokio::spawn(async move {
                        let mine = format!("default_{}", i);
                        let got = cache.get_or_set("shared", mine, None).await;
                        assert!(got.starts_with("default_"));
                    })
                })
                .collect();
            for handle in handles {
                handle.await.unwrap();
            }

            let stats = cache.stats();
            assert_eq!(stats.hits + stats.misses, 20);
            assert!(stats.sets >= 1);
            assert_eq!(cache.size().await, 1);
        });
    }
}
