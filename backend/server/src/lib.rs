//! BorkChain backend.
//!
//! SQLite-backed ledger for tasks, referrals, streaks, fundraiser contributions
//! and airdrop claims, served over a JSON REST API.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;

pub use config::Config;
pub use errors::{Result, ServerError};
pub use routes::create_router;
pub use state::AppState;
