//! Wash Loyalty - car-wash loyalty program API backend
//!
//! Serves loyalty data from the chain ledger through a cache-coherent
//! gateway, with transaction orchestration and background maintenance.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wash_loyalty::api::{create_router, AppState};
use wash_loyalty::cache::{Cache, CacheStore};
use wash_loyalty::chain::{Chain, HttpChain, MemoryChain};
use wash_loyalty::config::Config;
use wash_loyalty::ledger::LedgerGateway;
use wash_loyalty::notify::{Broadcaster, LogNotifier, Notifier};
use wash_loyalty::orchestrator::{MemoryBlobStore, Orchestrator};
use wash_loyalty::store::{MemoryStore, UserStore};
use wash_loyalty::tasks::{spawn_cleanup_task, spawn_coupon_sweep};

/// Owner address assumed by the in-memory chain when no bridge is configured.
const DEV_OWNER_ADDRESS: &str = "0x0000000000000000000000000000000000000001";

/// Main entry point for the loyalty backend.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the component graph: cache, chain client, gateway, store,
///    notifier, broadcaster, orchestrator
/// 4. Start background tasks (TTL cleanup, coupon expiry sweep)
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wash_loyalty=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Wash Loyalty backend");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, default_ttl={}s, port={}, chain_url={}",
        config.max_entries, config.default_ttl, config.server_port, config.chain_url
    );

    // Component graph
    let cache = Cache::new(CacheStore::new(config.max_entries, config.default_ttl));
    let chain: Arc<dyn Chain> = if config.chain_url == "memory" {
        info!("Using in-memory chain (no bridge configured)");
        Arc::new(MemoryChain::new(DEV_OWNER_ADDRESS))
    } else {
        Arc::new(
            HttpChain::new(&config.chain_url, config.chain_timeout_duration())
                .context("failed to build chain bridge client")?,
        )
    };
    let gateway = LedgerGateway::new(cache.clone(), Arc::clone(&chain));
    let store: Arc<dyn UserStore> = Arc::new(MemoryStore::new());
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let broadcaster = Broadcaster::new();
    let orchestrator = Arc::new(Orchestrator::new(
        gateway.clone(),
        Arc::clone(&store),
        Arc::clone(&notifier),
        broadcaster.clone(),
        Arc::new(MemoryBlobStore::new()),
        config.chain_timeout_duration(),
    ));
    info!("Component graph initialized");

    // Background tasks
    let mut task_handles = vec![spawn_cleanup_task(cache.store(), config.cleanup_interval)];
    if config.coupon_sweep_interval > 0 {
        task_handles.push(spawn_coupon_sweep(
            Arc::clone(&chain),
            Arc::clone(&notifier),
            broadcaster.clone(),
            config.coupon_sweep_interval,
        ));
    } else {
        info!("Coupon expiry sweep disabled");
    }

    let app = create_router(AppState::new(gateway, store, orchestrator));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(task_handles, config.shutdown_grace))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the background tasks and gives each a bounded
/// grace period to wind down before the server stops accepting connections.
async fn shutdown_signal(task_handles: Vec<JoinHandle<()>>, grace_secs: u64) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
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

    let grace = Duration::from_secs(grace_secs);
    for handle in task_handles {
        handle.abort();
        if tokio::time::timeout(grace, handle).await.is_err() {
            warn!("background task did not stop within the grace period");
        }
    }
    info!("Background tasks stopped");
}
