//! Flat-file document CMS server

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cms::{app, AppState, Config};

#[derive(Parser, Debug)]
#[command(name = "cms")]
#[command(about = "Flat-file document CMS with session-based sign-in")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 4567, env = "CMS_PORT")]
    port: u16,

    /// Address to bind to
    #[arg(long, default_value = "127.0.0.1", env = "CMS_BIND")]
    bind: String,

    /// Path to config directory (holds config.json)
    #[arg(long, default_value = ".", env = "CMS_CONFIG_PATH")]
    config_path: PathBuf,

    /// Document directory, overriding config.json
    #[arg(long, env = "CMS_DATA_PATH")]
    data_path: Option<PathBuf>,

    /// Credential file, overriding config.json
    #[arg(long, env = "CMS_USERS_FILE")]
    users_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cms=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(&cli.config_path)?;
    if let Some(data_path) = cli.data_path {
        config.data_path = data_path;
    }
    if let Some(users_file) = cli.users_file {
        config.credential_path = users_file;
    }

    tracing::info!("Documents: {:?}", config.data_path);
    tracing::info!("Credentials: {:?}", config.credential_path);

    let state = AppState::new(config)?;

    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port)
        .parse()
        .context("Invalid bind address")?;

    tracing::info!("Starting cms on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("cms shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
