//! Request and response shapes exchanged between the server and its clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::badge::{BadgeInfo, BadgeTier};
use crate::streak::StreakUpdate;
use crate::types::{Address, Referral, User};
use crate::validation::{ClaimDetails, ContributionInput};

// ─────────────────────────────────────────────────────────
// Wallet & tasks
// ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectRequest {
    pub address: Address,
    /// The `ref` query parameter the page was loaded with, if any.
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub referral: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectResponse {
    pub user: User,
    pub created: bool,
    pub referrer: Option<Address>,
    pub streak: StreakUpdate,
    pub completed_task_ids: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CompleteTaskRequest {
    pub address: Address,
}

/// Outcome of a completion command. A duplicate is not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CompletionStatus {
    Credited { reward: i64, balance: i64 },
    AlreadyCompleted { balance: i64 },
}

impl CompletionStatus {
    pub fn balance(&self) -> i64 {
        match *self {
            CompletionStatus::Credited { balance, .. }
            | CompletionStatus::AlreadyCompleted { balance } => balance,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteTaskResponse {
    pub task_id: String,
    #[serde(flatten)]
    pub status: CompletionStatus,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user: User,
    pub completed_task_ids: Vec<String>,
    pub referrals: Vec<Referral>,
}

// ─────────────────────────────────────────────────────────
// Leaderboards
// ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub address: Address,
    pub balance: i64,
    pub total_earned: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferralLeaderboardEntry {
    pub rank: u32,
    pub address: Address,
    pub referrals: i64,
    pub earned: i64,
}

// ─────────────────────────────────────────────────────────
// Fundraiser & badges
// ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContributionRequest {
    pub address: Address,
    #[serde(flatten)]
    pub input: ContributionInput,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FundraiserSummary {
    pub total_raised: f64,
    pub target: f64,
    pub progress_percent: f64,
    pub contributors: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BadgeSummary {
    pub total: f64,
    pub tier: BadgeTier,
    pub name: String,
    pub range: String,
    pub benefits: Vec<String>,
}

impl BadgeSummary {
    pub fn new(total: f64, info: &BadgeInfo) -> Self {
        Self {
            total,
            tier: info.id,
            name: info.name.to_string(),
            range: info.range_label(),
            benefits: info.benefits.iter().map(|b| b.to_string()).collect(),
        }
    }
}

// ─────────────────────────────────────────────────────────
// Airdrop
// ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AirdropPaymentRequest {
    pub address: Address,
    pub tx_hash: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AirdropClaimRequest {
    pub address: Address,
    #[serde(flatten)]
    pub details: ClaimDetails,
}

// ─────────────────────────────────────────────────────────
// Admin
// ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Admin correction to a user record. Absent fields are left unchanged.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub balance: Option<i64>,
    #[serde(default)]
    pub is_admin: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdminStats {
    pub users: i64,
    pub tasks: i64,
    pub completions: i64,
    pub total_distributed: i64,
    pub total_raised: f64,
    pub pending_contributions: i64,
}
