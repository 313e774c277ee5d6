pub mod api;
pub mod config;
pub mod telemetry;
pub mod wait;

use anyhow::Context;
use compprops::pool::{Pool, create_pool};
use config::ServerConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Load configuration, connect, and serve until a shutdown signal arrives.
pub async fn run() -> anyhow::Result<()> {
    // Load environment variables from .env if present
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env()?;
    telemetry::init(&config.log_level, config.json_logs)?;

    let pool = connect(&config).await?;
    let app = api::router(Arc::new(pool.clone()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        "compprops is running at http://localhost:{}/",
        config.server_port
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("closing database pool");
    pool.close();
    Ok(())
}

/// Wait for the database endpoint, build the pool and check out one
/// connection to prove the credentials work.
async fn connect(config: &ServerConfig) -> anyhow::Result<Pool> {
    info!("Connecting");
    if let Some((host, port)) = &config.db_endpoint {
        info!("Waiting for tcp:{host}:{port}");
        let attempts = wait::wait_for_tcp(
            host,
            *port,
            config.wait_timeout,
            &wait::Backoff::default(),
        )
        .await?;
        tracing::debug!(attempts, "database endpoint reachable");
    }

    info!("Initializing pool (max_size={})", config.pool_size);
    let pool = create_pool(config.pg.clone(), config.pool_size)?;
    drop(
        pool.get()
            .await
            .context("failed to connect to database")?,
    );
    info!("Connected to database");
    Ok(pool)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
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
    info!("shutdown signal received, draining requests");
}
