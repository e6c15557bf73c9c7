use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use warden_server::{AppState, InMemoryUserStore, build_router, load_config};
use warden_token::{RevocationRegistry, SessionManager};

#[derive(Parser, Debug)]
#[command(name = "warden-server", version, about = "Warden session token service")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, env = "WARDEN_CONFIG", default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli.config)?;

    // Missing secret or zero TTLs stop startup here.
    let token_config = cfg.auth.token_config()?;
    tracing::info!(config = ?token_config, "token settings loaded");

    let registry = Arc::new(RevocationRegistry::new());
    let sessions = SessionManager::new(&token_config, registry)?;
    let sweeper = sessions.start_sweeper();

    let users = Arc::new(InMemoryUserStore::with_demo_users()?);
    let state = Arc::new(AppState::new(sessions, users));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind).await?;
    tracing::info!(address = %cfg.server.bind, "warden-server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    tracing::info!("warden-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
