//! # Lending API Server
//!
//! Loads configuration, opens the record store and serves the HTTP API.
//!
//! ```text
//! ApiConfig::load()  ──►  open_store()  ──►  axum::serve  ──►  Ctrl+C / SIGTERM
//!  defaults               JSON dir or        /api/*            graceful drain
//!  lending.toml           SQLite file
//!  LENDING_* env
//! ```

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lending_api::config::ApiConfig;
use lending_api::{serve, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Lending API server...");

    let config = ApiConfig::load().context("loading configuration")?;
    info!(
        addr = %config.bind_address(),
        backend = %config.storage.backend,
        data_dir = %config.storage.data_dir.display(),
        "Configuration loaded"
    );

    let state = AppState::from_config(&config)
        .await
        .context("opening record store")?;

    serve(&config, state, shutdown_signal())
        .await
        .context("running HTTP server")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Installs the fmt subscriber; `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,lending_api=debug,lending_store=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
