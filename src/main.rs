//! TTL Cache - demo server
//!
//! Serves a cache-aside user lookup over HTTP in front of a simulated slow
//! database, with a background sweeper cleaning expired entries.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use serde_json::{json, Value};
use tokio::signal;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::api::{create_router, AppState};
use ttl_cache::{Cache, Config};

/// Main entry point for the cache demo server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache (which starts its sweeper)
/// 4. Optionally seed demo entries in the background
/// 5. Serve the Axum router until SIGINT/SIGTERM
/// 6. Shut the cache down
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TTL cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: default_ttl={}s, cleanup_interval={}s, port={}",
        config.default_ttl, config.cleanup_interval, config.server_port
    );

    let state = AppState::from_config(&config);
    let cache = state.cache.clone();

    if config.seed_demo_data {
        tokio::spawn(seed_demo_data(cache.clone()));
    }

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    match cache.export_json().await {
        Ok(dump) => debug!("Final cache state:\n{}", dump),
        Err(err) => warn!("Could not export cache state: {}", err),
    }
    cache.shutdown().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Populates the cache with a few long-lived examples, then runs 100
/// concurrent writers each reading its own key back five times.
async fn seed_demo_data(cache: Cache<Value>) {
    tokio::time::sleep(Duration::from_secs(1)).await;
    info!("Seeding demo data");

    cache
        .set(
            "example:1",
            json!("First example entry"),
            Some(Duration::from_secs(120)),
        )
        .await;
    cache
        .set(
            "example:2",
            json!({ "kind": "object", "value": 42, "active": true }),
            Some(Duration::from_secs(90)),
        )
        .await;

    let workers: Vec<_> = (0..100)
        .map(|id| {
            let cache = cache.clone();
            tokio::spawn(async move {
                let key = format!("concurrent:{}", id);
                cache
                    .set(
                        key.clone(),
                        json!(format!("value_{}", id)),
                        Some(Duration::from_secs(15)),
                    )
                    .await;

                for _ in 0..5 {
                    cache.get(&key).await;
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            })
        })
        .collect();

    for worker in workers {
        if let Err(err) = worker.await {
            warn!("Demo worker failed: {}", err);
        }
    }

    let stats = cache.stats();
    info!(
        "Demo data seeded: hits={}, misses={}, sets={}",
        stats.hits, stats.misses, stats.sets
    );
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
