mod bootstrap;
mod health;
mod routes;

use std::future::IntoFuture;
use std::time::Duration;

use anyhow::Result;
use maitred_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use maitred_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;
    let drain_deadline = Duration::from_secs(app.config.server.graceful_shutdown_secs);

    let router = routes::router(app.runtime.clone()).merge(health::router(app.db_pool.clone()));
    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    tracing::info!(
        event_name = "system.server.started",
        bind_address = %address,
        "maitred-server listening"
    );

    let (signal_tx, signal_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, router).with_graceful_shutdown(async move {
        let _ = signal_rx.await;
    });
    let server_task = tokio::spawn(server.into_future());

    tokio::signal::ctrl_c().await?;
    tracing::info!(event_name = "system.server.stopping", "shutdown signal received");
    let _ = signal_tx.send(());

    if tokio::time::timeout(drain_deadline, server_task).await.is_err() {
        tracing::warn!(
            event_name = "system.server.drain_timeout",
            "open connections did not drain before the shutdown deadline"
        );
    }

    app.db_pool.close().await;
    Ok(())
}
