//! Hotseat server binary.

use anyhow::Result;
use clap::Parser;
use hotseat_engine::Table;
use hotseat_server::{Args, ServerConfig, attach_mirror, router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::resolve(Args::parse())?;
    info!(port = config.port, "Starting hotseat server");

    let table = Table::new(config.table_config());
    if let Some(path) = &config.mirror {
        attach_mirror(&table, path).await?;
    }

    let app = router(table);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("✅ Table open at http://localhost:{}/", config.port);
    info!("🎮 Players join via POST /player/subscribe");

    axum::serve(listener, app).await?;

    Ok(())
}
