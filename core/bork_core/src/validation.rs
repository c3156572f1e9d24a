//! Input validation for contributions, tasks and airdrop claims.
//!
//! Validation runs before any request leaves the caller; a failure here means
//! nothing was sent.

use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};
use crate::types::{Difficulty, TaskType};

pub const MIN_CONTRIBUTION: f64 = 5.0;
pub const MIN_TX_HASH_LEN: usize = 10;
pub const FUNDRAISER_TARGET: f64 = 100_000.0;
pub const SUPPORTED_CURRENCIES: [&str; 4] = ["USDT", "USDT_ETH", "ETH", "BNB"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContributionInput {
    pub amount: f64,
    pub currency: String,
    pub tx_hash: String,
}

impl ContributionInput {
    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() {
            return Err(CoreError::Validation("Amount must be a number".to_string()));
        }
        if self.amount < MIN_CONTRIBUTION {
            return Err(CoreError::Validation(format!(
                "Minimum contribution is ${MIN_CONTRIBUTION}"
            )));
        }
        if !SUPPORTED_CURRENCIES.contains(&self.currency.as_str()) {
            return Err(CoreError::Validation(format!(
                "Unsupported currency: {}",
                self.currency
            )));
        }
        validate_tx_hash(&self.tx_hash)
    }
}

pub fn validate_tx_hash(tx_hash: &str) -> Result<()> {
    if tx_hash.trim().len() < MIN_TX_HASH_LEN {
        return Err(CoreError::Validation(
            "Please enter a valid transaction hash".to_string(),
        ));
    }
    Ok(())
}

/// Payload for creating or editing a task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub reward: i64,
    pub difficulty: Difficulty,
    pub task_type: TaskType,
    #[serde(default)]
    pub destination_url: Option<String>,
}

impl TaskInput {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() || self.description.trim().is_empty() {
            return Err(CoreError::Validation(
                "Please fill in all required fields".to_string(),
            ));
        }
        if self.reward <= 0 {
            return Err(CoreError::Validation(
                "Reward must be a positive amount".to_string(),
            ));
        }
        if let Some(url) = &self.destination_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(CoreError::Validation(
                    "Destination URL must be an HTTP(S) URL".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub twitter_handle: Option<String>,
    #[serde(default)]
    pub telegram_handle: Option<String>,
}

impl ClaimDetails {
    /// Blank strings are treated as absent.
    pub fn normalized(self) -> Self {
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        ClaimDetails {
            email: clean(self.email),
            twitter_handle: clean(self.twitter_handle),
            telegram_handle: clean(self.telegram_handle),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(email) = &self.email {
            let valid = email
                .split_once('@')
                .map(|(local, domain)| {
                    !local.is_empty() && domain.contains('.') && !domain.ends_with('.')
                })
                .unwrap_or(false);
            if !valid {
                return Err(CoreError::Validation("Invalid email address".to_string()));
            }
        }
        Ok(())
    }
}

/// Percentage of the fundraiser target reached, capped at 100.
pub fn progress_percent(total_raised: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 100.0;
    }
    (total_raised / target * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contribution(amount: f64, currency: &str, tx: &str) -> ContributionInput {
        ContributionInput {
            amount,
            currency: currency.to_string(),
            tx_hash: tx.to_string(),
        }
    }

    #[test]
    fn test_contribution_validation() {
        assert!(contribution(5.0, "USDT", "0x12345678ab").validate().is_ok());
        assert!(contribution(4.99, "USDT", "0x12345678ab").validate().is_err());
        assert!(contribution(f64::NAN, "USDT", "0x12345678ab").validate().is_err());
        assert!(contribution(50.0, "DOGE", "0x12345678ab").validate().is_err());
        assert!(contribution(50.0, "ETH", "short").validate().is_err());
    }

    #[test]
    fn test_task_validation() {
        let mut input = TaskInput {
            title: "Follow BorkChain on Twitter".into(),
            description: "Follow our official Twitter account".into(),
            reward: 50,
            difficulty: Difficulty::Easy,
            task_type: TaskType::OneTime,
            destination_url: Some("https://twitter.com/BorkChain".into()),
        };
        assert!(input.validate().is_ok());

        input.reward = 0;
        assert!(input.validate().is_err());

        input.reward = 50;
        input.title = "  ".into();
        assert!(input.validate().is_err());

        input.title = "ok".into();
        input.destination_url = Some("javascript:alert(1)".into());
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_claim_details() {
        let details = ClaimDetails {
            email: Some("  ".into()),
            twitter_handle: Some("@bork".into()),
            telegram_handle: None,
        }
        .normalized();
        assert_eq!(details.email, None);
        assert!(details.validate().is_ok());

        let bad = ClaimDetails {
            email: Some("not-an-email".into()),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_progress_is_capped() {
        assert_eq!(progress_percent(50_000.0, FUNDRAISER_TARGET), 50.0);
        assert_eq!(progress_percent(250_000.0, FUNDRAISER_TARGET), 100.0);
    }
}
