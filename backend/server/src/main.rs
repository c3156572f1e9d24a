//! BorkChain API server.

use anyhow::Context;
use bork_server::{server, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().context("loading configuration")?;
    config.validate().context("validating configuration")?;

    info!(
        "BorkChain server starting - database: {}, bind: {}",
        config.database_url, config.bind_addr
    );

    let state = server::prepare_state(config)
        .await
        .context("preparing database")?;

    server::run_server(state).await.context("serving API")?;
    Ok(())
}
