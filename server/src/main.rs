use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use todo_server::config::ServerConfig;
use todo_server::{logging, AppState, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    logging::init(config.log_format).context("failed to initialise logging")?;

    if config.base_url.is_none() {
        warn!("TODO_BASE_URL not set; the widget will load assets from relative paths");
    }

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    let state = AppState::new(Store::new(), config.base_url);
    todo_server::run(listener, state).await.context("server error")
}
