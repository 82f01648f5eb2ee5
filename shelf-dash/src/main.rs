//! shelf-dash - Book recommendation dashboard backend
//!
//! Startup order: config, logging, data folder, saved preferences, remote API
//! client, list worker, HTTP server. On Ctrl+C or SIGTERM the server drains
//! and unsaved preferences are flushed before exit.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use shelf_client::{AiService, BookService, HttpTransport, Transport, WorkerHandle};
use shelf_common::config::{resolve_data_folder, TomlConfig};
use shelf_common::time::millis_to_duration;
use shelf_common::DashboardState;
use shelf_dash::persist::{load_prefs, prefs_path, PrefsPersister};
use shelf_dash::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command-line arguments for shelf-dash
#[derive(Parser, Debug)]
#[command(name = "shelf-dash")]
#[command(about = "Book recommendation dashboard backend")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "SHELF_PORT")]
    port: Option<u16>,

    /// Base URL of the remote recommendation API
    #[arg(long, env = "SHELF_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Folder holding saved preferences
    #[arg(short, long, env = "SHELF_DATA_FOLDER")]
    data_folder: Option<PathBuf>,

    /// Explicit TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, config_warning) = TomlConfig::load(args.config.as_deref());

    init_tracing(&config)?;
    if let Some(warning) = config_warning {
        warn!("{}", warning);
    }

    info!(
        "Starting Shelf Dashboard (shelf-dash) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let data_folder = resolve_data_folder(args.data_folder.as_deref(), &config);
    std::fs::create_dir_all(&data_folder)
        .with_context(|| format!("Failed to create data folder {}", data_folder.display()))?;
    info!("Data folder: {}", data_folder.display());

    let prefs_file = prefs_path(&data_folder);
    let prefs = load_prefs(&prefs_file);
    let persister = PrefsPersister::spawn(prefs_file, prefs, millis_to_duration(config.prefs_debounce_ms));

    let api_base_url = args.api_base_url.unwrap_or_else(|| config.api_base_url.clone());
    let transport: Arc<dyn Transport> = Arc::new(
        HttpTransport::new(&api_base_url, Duration::from_secs(config.request_timeout_secs))
            .context("Failed to build HTTP client")?,
    );
    info!("Remote API: {}", api_base_url);

    let ttl = Duration::from_secs(config.cache_ttl_secs);
    let books = BookService::with_ttl(Arc::clone(&transport), ttl);
    let ai = AiService::with_ttl(transport, ttl);

    let worker = WorkerHandle::spawn()
        .context("Failed to start list worker")?
        .with_default_timeout(millis_to_duration(config.worker_timeout_ms));

    let state = AppState::new(books, ai, worker, DashboardState::from_prefs(prefs), persister.handle());
    let app = build_router(state);

    let port = args.port.unwrap_or(config.port);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("shelf-dash listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    persister.shutdown().await;
    info!("Shutdown complete");
    Ok(())
}

/// Log to stderr, or to `logging.file` when configured
///
/// `RUST_LOG` overrides `logging.level`.
fn init_tracing(config: &TomlConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
