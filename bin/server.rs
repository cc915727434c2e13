// Installment Tracker - Web Server
//
// Thin entry point: tracing, config, store, background reconciler, routes.
// All handlers live in `installment_tracker::api`.

use anyhow::{Context, Result};
use axum::http::Method;
use installment_tracker::api::{build_router, AppState};
use installment_tracker::{spawn_reconciler, BulkStateReconciler, Config, SqliteStore};
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    if let Some(dir) = config.db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let store = Arc::new(
        SqliteStore::open(&config.db_path, config.store_timeout)
            .with_context(|| format!("Failed to open database {}", config.db_path.display()))?,
    );
    info!(db = %config.db_path.display(), "database opened");

    // Background reconciler: once now, then every interval
    let reconciler = Arc::new(BulkStateReconciler::with_concurrency(
        Arc::clone(&store),
        config.reconcile_concurrency,
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = spawn_reconciler(
        Arc::clone(&reconciler),
        config.reconcile_interval,
        shutdown_rx,
    );

    let app = build_router(AppState::new(store, reconciler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers(Any),
        );

    let listener = tokio::net::TcpListener::bind(config.server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server_addr))?;
    info!("🚀 installment-server listening on http://{}", config.server_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("server crashed")?;

    let _ = shutdown_tx.send(true);
    scheduler.await.context("reconciler task failed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
