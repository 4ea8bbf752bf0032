//! Lab Music Space (lms-space) - Main entry point
//!
//! Serves the password-gated dashboard that places a lab's favorite tracks
//! in a 3D feature space.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;

use lms_common::logging::init_tracing;
use lms_space::config::{SpaceConfig, DEFAULT_PORT};
use lms_space::services::HttpCatalogConnector;
use lms_space::{build_router, AppState};

/// Command-line arguments for lms-space
#[derive(Parser, Debug)]
#[command(name = "lms-space")]
#[command(about = "Lab Music Space dashboard")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "LMS_SPACE_PORT")]
    port: Option<u16>,

    /// Path to the TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Sealed bundle file (overrides the compiled-in bundle)
    #[arg(short, long, env = "LMS_SPACE_BUNDLE")]
    bundle: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = SpaceConfig::load(args.config.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(args.port, args.bundle);

    init_tracing(&config.logging);

    info!(
        "Starting Lab Music Space v{} on port {} (default {})",
        env!("CARGO_PKG_VERSION"),
        config.port,
        DEFAULT_PORT
    );

    let bundle = config.load_bundle().context("Failed to load sealed bundle")?;
    info!(iterations = bundle.iterations, "Sealed bundle ready");

    let connector = Arc::new(HttpCatalogConnector::new(config.catalog.clone()));

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.bind_address))?;

    let app_state = AppState::new(config, bundle, connector);
    let app = build_router(app_state);

    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
