//! Process startup: database preparation and the HTTP listener.

use chrono::Utc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::routes::create_router;
use crate::state::AppState;

/// Open the database, seed defaults and promote the configured admin wallet.
pub async fn prepare_state(config: Config) -> Result<AppState> {
    let pool = db::init_pool(&config.database_url).await?;

    let seeded = db::seed_default_tasks(&pool, Utc::now()).await?;
    if seeded > 0 {
        info!("Seeded {} default tasks", seeded);
    }

    if let Some(address) = &config.admin_address {
        db::create_admin_user(&pool, address, Utc::now()).await?;
        info!("Admin wallet {} ready", address);
    }

    Ok(AppState::new(pool, config))
}

/// Run the API server until the listener fails.
pub async fn run_server(state: AppState) -> Result<()> {
    let addr = state.config.bind_addr;
    let router = create_router(state);

    let listener = TcpListener::bind(addr).await?;
    info!("BorkChain API listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}
