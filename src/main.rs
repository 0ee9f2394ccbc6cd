use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use text_analysis::cache::{self, CacheBackend};
use text_analysis::compute::{self, ComputeService};
use text_analysis::config::Config;
use text_analysis::intake::{self, IntakeService, Reconciler};
use text_analysis::store::MemoryRequestStore;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let role = args.get(1).map(String::as_str);
    if !matches!(role, Some("intake") | Some("compute")) {
        eprintln!("Usage: {} <intake|compute>", args[0]);
        eprintln!("Example: INTAKE_ADDR=127.0.0.1:8080 COMPUTE_ADDR=127.0.0.1:8081 CACHE_ADDR=127.0.0.1:6379 {} intake", args[0]);
        std::process::exit(1);
    }

    // 1. Configuration:
    let config = Config::from_env()?;
    tracing::info!("Loaded configuration: {:?}", config);

    // 2. Cache backend (connects lazily):
    let backend = cache::backend_from_addr(&config.cache_addr)?;

    match role {
        Some("intake") => run_intake(config, backend).await,
        _ => run_compute(config, backend).await,
    }
}

async fn run_intake(config: Config, backend: Arc<dyn CacheBackend>) -> anyhow::Result<()> {
    let store = Arc::new(MemoryRequestStore::new());
    let service = IntakeService::from_config(&config, store, backend)?;

    let reconciler = Reconciler::new(
        service.clone(),
        config.reconcile_after,
        config.reconcile_interval,
        config.reconcile_max_attempts,
    );
    let sweeper = reconciler.spawn();

    let app = intake::router(service, &config.intake_addr);
    serve(&config.intake_addr, app, config.shutdown_grace).await?;

    sweeper.abort();
    Ok(())
}

async fn run_compute(config: Config, backend: Arc<dyn CacheBackend>) -> anyhow::Result<()> {
    let service = ComputeService::from_config(&config, backend)?;
    let pool = service.spawn_workers(config.worker_count).await;

    let app = compute::router(service);
    serve(&config.compute_addr, app, config.shutdown_grace).await?;

    pool.shutdown().await;
    Ok(())
}

/// Serves `app` until SIGINT/SIGTERM, then gives in-flight requests `grace` to finish.
async fn serve(addr: &str, app: Router, grace: Duration) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("HTTP server listening on {}", listener.local_addr()?);
    tracing::info!("Press Ctrl+C to shutdown");

    let stop = Arc::new(Notify::new());
    let stop_signal = stop.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { stop_signal.notified().await })
            .await
    });

    shutdown_signal().await;
    tracing::info!("Shutdown requested, draining for up to {:?}", grace);
    stop.notify_one();

    match tokio::time::timeout(grace, server).await {
        Ok(joined) => joined??,
        Err(_) => tracing::warn!("Grace period elapsed, abandoning in-flight requests"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
