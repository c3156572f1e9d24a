//! Shared application state for the HTTP handlers.

use std::collections::HashMap;
use std::sync::Arc;

use bork_core::admin::AdminSession;
use sqlx::SqlitePool;
use tokio::sync::RwLock;

use crate::config::Config;
use crate::db::LedgerSettings;

/// Admin sessions keyed by bearer token.
pub type SessionMap = Arc<RwLock<HashMap<String, AdminSession>>>;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Arc<Config>,
    pub sessions: SessionMap,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: Config) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn ledger_settings(&self) -> LedgerSettings {
        LedgerSettings {
            referral_bonus: self.config.referral_bonus,
            streak_bonus: self.config.streak_bonus,
        }
    }
}
