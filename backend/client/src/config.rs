//! Configuration for the BorkChain client.
//!
//! Loads all settings from environment variables.

use std::path::PathBuf;

use crate::errors::{ClientError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the BorkChain API (e.g., http://localhost:8080)
    pub api_url: String,

    /// JSON file holding the persisted session
    pub state_file: PathBuf,

    /// Account the static wallet reports, if any
    pub wallet_address: Option<String>,

    /// Site URL used to build referral links
    pub referral_base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional variables (with defaults):
    /// - `BORK_API_URL`: defaults to `http://localhost:8080`
    /// - `BORK_STATE_FILE`: defaults to `.bork-session.json`
    /// - `BORK_WALLET_ADDRESS`: unset by default
    /// - `REFERRAL_BASE_URL`: defaults to `https://borkchain.io`
    /// - `TIMEOUT_SECS`: defaults to 30
    pub fn from_env() -> Result<Self> {
        Ok(Config {
            api_url: env_var("BORK_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),

            state_file: env_var("BORK_STATE_FILE")
                .unwrap_or_else(|_| ".bork-session.json".to_string())
                .into(),

            wallet_address: env_var("BORK_WALLET_ADDRESS")
                .ok()
                .filter(|s| !s.trim().is_empty()),

            referral_base_url: env_var("REFERRAL_BASE_URL")
                .unwrap_or_else(|_| "https://borkchain.io".to_string()),

            timeout_secs: env_var("TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| ClientError::Config("Invalid TIMEOUT_SECS".to_string()))?,
        })
    }

    /// Validate that the configuration is well-formed.
    pub fn validate(&self) -> Result<()> {
        for (key, url) in [
            ("BORK_API_URL", &self.api_url),
            ("REFERRAL_BASE_URL", &self.referral_base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ClientError::Config(format!(
                    "{key} must be an http(s) URL"
                )));
            }
        }

        if self.timeout_secs == 0 {
            return Err(ClientError::Config(
                "TIMEOUT_SECS must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ClientError::Config(format!("Missing environment variable: {key}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_config() -> Config {
        Config {
            api_url: "http://localhost:8080".to_string(),
            state_file: PathBuf::from(".bork-session.json"),
            wallet_address: None,
            referral_base_url: "https://borkchain.io".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(mock_config().validate().is_ok());
    }

    #[test]
    fn test_validate_api_url() {
        let mut config = mock_config();
        config.api_url = "localhost:8080".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_timeout() {
        let mut config = mock_config();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
