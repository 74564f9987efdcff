//! Runnable Brickwork server.
//!
//! Usage: `brickwork-server [config.json]`. Without an argument the server
//! runs with the default configuration; see `ServerConfig` for the fields
//! a config file may override.

use brickwork::{BrickworkError, Server, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), BrickworkError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::load(&path)?,
        None => ServerConfig::default(),
    };

    let server = Server::builder().config(config).build().await?;
    if let Ok(addr) = server.local_addr() {
        tracing::info!(%addr, "listening");
    }
    server.run().await;
    Ok(())
}
