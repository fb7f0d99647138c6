//! TuneHub web service - Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tunehub_common::config::{self, Config};
use tunehub_web::{api, AppState};

/// Command-line arguments for tunehub-web
#[derive(Parser, Debug)]
#[command(name = "tunehub-web")]
#[command(about = "TuneHub music-sharing web service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5780", env = "TUNEHUB_PORT")]
    port: u16,

    /// Root folder holding the database and uploaded songs
    #[arg(short, long, env = "TUNEHUB_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tunehub_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let config = Config {
        port: args.port,
        root_folder: config::resolve_root_folder(args.root_folder),
    };

    info!("Starting TuneHub on port {}", config.port);
    info!("Root folder: {}", config.root_folder.display());

    config::ensure_directories(&config).context("Failed to initialize root folder")?;

    let db = tunehub_common::db::init_database(&config.db_path())
        .await
        .context("Failed to initialize database")?;
    info!("Database ready: {}", config.db_path().display());

    let state = AppState {
        db,
        upload_dir: config.upload_dir(),
    };
    let app = api::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
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
        }
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        }
    }
}
