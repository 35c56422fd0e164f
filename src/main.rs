// ABOUTME: Entry point for the csatd binary.
// ABOUTME: Loads configuration, initializes tracing, opens the response store once, and serves HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use csat_server::{AppState, CsatConfig, create_router};
use csat_store::{Backend, open_store};

/// Customer-satisfaction survey collector.
#[derive(Debug, Parser)]
#[command(name = "csatd", version, about)]
struct Cli {
    /// Storage directory (overrides CSAT_HOME).
    #[arg(long)]
    home: Option<PathBuf>,

    /// Address to listen on (overrides CSAT_BIND).
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Storage backend, `json` or `sqlite` (overrides CSAT_BACKEND).
    #[arg(long)]
    backend: Option<Backend>,

    /// Directory of dashboard assets to serve (overrides CSAT_STATIC_DIR).
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "csatd=debug,csat_server=debug,csat_store=info,tower_http=debug",
                )
            }),
        )
        .init();

    let cli = Cli::parse();
    let mut config = CsatConfig::from_env().context("invalid configuration")?;
    if let Some(home) = cli.home {
        config.home = home;
    }
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if cli.static_dir.is_some() {
        config.static_dir = cli.static_dir;
    }

    tracing::info!("csatd starting up");
    tracing::info!("storage location: {}", config.home.display());

    let store = open_store(config.backend, &config.home)
        .with_context(|| format!("failed to open storage in {}", config.home.display()))?;
    let existing = store.stats().context("failed to read existing responses")?;
    tracing::info!("existing responses: {}", existing.total);

    let state = Arc::new(AppState::new(store, config.home.clone()));
    let app = create_router(state, config.static_dir.clone());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("csatd stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}
