use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use todo_server::config::ServerConfig;
use todo_server::{store, AppState};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("todo-server error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing()?;

    let config = ServerConfig::load().context("failed to load configuration")?;
    let store = store::connect(&config.storage)
        .await
        .context("failed to open todo storage")?;
    let router = todo_server::app_with_config(AppState::new(store), &config)?;

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        addr = %listener.local_addr()?,
        backend = ?config.storage.backend,
        "listening"
    );

    todo_server::serve(listener, router, shutdown_signal())
        .await
        .context("server stopped with an error")?;
    info!("shut down");
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("TODO_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "cannot listen for ctrl-c, running until killed");
        std::future::pending::<()>().await;
    }
}
