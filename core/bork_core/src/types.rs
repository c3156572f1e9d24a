//! Core data types for users, tasks, referrals and contributions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CoreError, Result};

// ─────────────────────────────────────────────────────────
// Wallet address
// ─────────────────────────────────────────────────────────

/// An EVM wallet address, normalized to lower case.
///
/// Every comparison between addresses in the system is case-insensitive, so the
/// normalization happens once here and the rest of the code compares strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let hex_part = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| CoreError::InvalidAddress(format!("{trimmed} (missing 0x prefix)")))?;

        if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidAddress(format!(
                "{trimmed} (expected 40 hex characters)"
            )));
        }

        Ok(Address(format!("0x{}", hex_part.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Address::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self> {
        Address::parse(&value)
    }
}

impl From<Address> for String {
    fn from(value: Address) -> Self {
        value.0
    }
}

// ─────────────────────────────────────────────────────────
// Tasks
// ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(CoreError::UnknownVariant {
                kind: "difficulty",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskType {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "one-time")]
    OneTime,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Daily => "daily",
            TaskType::Weekly => "weekly",
            TaskType::OneTime => "one-time",
        }
    }
}

impl FromStr for TaskType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "daily" => Ok(TaskType::Daily),
            "weekly" => Ok(TaskType::Weekly),
            "one-time" | "one_time" | "onetime" => Ok(TaskType::OneTime),
            _ => Err(CoreError::UnknownVariant {
                kind: "task type",
                value: s.to_string(),
            }),
        }
    }
}

/// A task definition. Rewards are whole $BORK.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reward: i64,
    pub difficulty: Difficulty,
    pub task_type: TaskType,
    pub destination_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletion {
    pub user_address: Address,
    pub task_id: String,
    pub completed_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────
// Users & referrals
// ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub address: Address,
    pub balance: i64,
    pub total_earned: i64,
    pub is_admin: bool,
    pub referral_code: String,
    pub referred_by: Option<Address>,
    pub joined_at: DateTime<Utc>,
    pub login_streak: i64,
    pub last_login: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub referrer_address: Address,
    pub referred_address: Address,
    pub reward: i64,
    pub created_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────
// Fundraiser
// ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub id: i64,
    pub wallet_address: Address,
    pub amount: f64,
    pub currency: String,
    pub tx_hash: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirdropClaim {
    pub wallet_address: Address,
    pub paid: bool,
    pub payment_tx_hash: Option<String>,
    pub email: Option<String>,
    pub twitter_handle: Option<String>,
    pub telegram_handle: Option<String>,
    pub eligible: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_normalizes_case() {
        let a = Address::parse("0xABCDEF0123456789abcdef0123456789ABCDEF01").unwrap();
        let b = Address::parse("  0xabcdef0123456789ABCDEF0123456789abcdef01 ").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn test_address_rejects_malformed() {
        assert!(Address::parse("").is_err());
        assert!(Address::parse("abcdef0123456789abcdef0123456789abcdef01").is_err());
        assert!(Address::parse("0x123...456").is_err());
        assert!(Address::parse("0xzzcdef0123456789abcdef0123456789abcdef01").is_err());
    }

    #[test]
    fn test_address_serde_validates() {
        let ok: Address =
            serde_json::from_str("\"0xABCDEF0123456789abcdef0123456789ABCDEF01\"").unwrap();
        assert_eq!(ok.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
        assert!(serde_json::from_str::<Address>("\"nope\"").is_err());
    }

    #[test]
    fn test_task_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskType::OneTime).unwrap(),
            "\"one-time\""
        );
        assert_eq!("one-time".parse::<TaskType>().unwrap(), TaskType::OneTime);
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("epic".parse::<Difficulty>().is_err());
    }
}
