//! Configuration for the BorkChain server.
//!
//! Loads all settings from environment variables.

use std::net::SocketAddr;

use bork_core::referral::DEFAULT_REFERRAL_BONUS;
use bork_core::streak::DEFAULT_STREAK_BONUS;
use bork_core::validation::FUNDRAISER_TARGET;
use bork_core::Address;

use crate::errors::{Result, ServerError};

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database URL (e.g., sqlite:bork.db?mode=rwc)
    pub database_url: String,

    /// Address the HTTP listener binds to
    pub bind_addr: SocketAddr,

    /// $BORK credited to a referrer per successful referral
    pub referral_bonus: i64,

    /// $BORK credited once per day on a streak login
    pub streak_bonus: i64,

    /// Admin dashboard credentials
    pub admin_username: String,
    pub admin_password: String,

    /// Wallet promoted to admin at startup (create_admin_user)
    pub admin_address: Option<Address>,

    /// Fundraiser goal in USD
    pub fundraiser_target: f64,

    /// Allow cross-origin requests from any origin
    pub enable_cors: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `ADMIN_PASSWORD`: admin dashboard password
    ///
    /// Optional variables (with defaults):
    /// - `DATABASE_URL`: defaults to `sqlite:bork.db?mode=rwc`
    /// - `BIND_ADDR`: defaults to `0.0.0.0:8080`
    /// - `REFERRAL_BONUS`: defaults to 100
    /// - `STREAK_BONUS`: defaults to 10
    /// - `ADMIN_USERNAME`: defaults to `admin`
    /// - `ADMIN_ADDRESS`: unset by default
    /// - `FUNDRAISER_TARGET`: defaults to 100000
    /// - `ENABLE_CORS`: defaults to true
    pub fn from_env() -> Result<Self> {
        let admin_address = match env_var("ADMIN_ADDRESS") {
            Ok(raw) if !raw.trim().is_empty() => Some(Address::parse(&raw)?),
            _ => None,
        };

        Ok(Config {
            database_url: env_var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:bork.db?mode=rwc".to_string()),

            bind_addr: env_var("BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
                .parse()
                .map_err(|_| ServerError::Config("Invalid BIND_ADDR".to_string()))?,

            referral_bonus: parse_or("REFERRAL_BONUS", DEFAULT_REFERRAL_BONUS)?,

            streak_bonus: parse_or("STREAK_BONUS", DEFAULT_STREAK_BONUS)?,

            admin_username: env_var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),

            admin_password: env_var("ADMIN_PASSWORD")?,

            admin_address,

            fundraiser_target: parse_or("FUNDRAISER_TARGET", FUNDRAISER_TARGET)?,

            enable_cors: parse_or("ENABLE_CORS", true)?,
        })
    }

    /// Validate that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.database_url.starts_with("sqlite:") {
            return Err(ServerError::Config(
                "DATABASE_URL must be a sqlite: URL".to_string(),
            ));
        }

        if self.referral_bonus < 0 || self.streak_bonus < 0 {
            return Err(ServerError::Config(
                "REFERRAL_BONUS and STREAK_BONUS must not be negative".to_string(),
            ));
        }

        if self.admin_password.len() < 8 {
            return Err(ServerError::Config(
                "ADMIN_PASSWORD must be at least 8 characters".to_string(),
            ));
        }

        if !(self.fundraiser_target.is_finite() && self.fundraiser_target > 0.0) {
            return Err(ServerError::Config(
                "FUNDRAISER_TARGET must be a positive number".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ServerError::Config(format!("Missing required environment variable: {key}")))
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ServerError::Config(format!("Invalid {key}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_database_url() {
        let mut config = mock_config();
        config.database_url = "postgres://localhost/bork".to_string();
        assert!(config.validate().is_err());

        config.database_url = "sqlite::memory:".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bonuses() {
        let mut config = mock_config();
        config.referral_bonus = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_admin_password() {
        let mut config = mock_config();
        config.admin_password = "admin".to_string();
        assert!(config.validate().is_err());
    }

    pub(crate) fn mock_config() -> Config {
        Config {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            referral_bonus: 100,
            streak_bonus: 10,
            admin_username: "admin".to_string(),
            admin_password: "admin-password".to_string(),
            admin_address: None,
            fundraiser_target: 100_000.0,
            enable_cors: false,
        }
    }
}
