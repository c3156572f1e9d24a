//! Database row shapes and their conversion into domain types.

use bork_core::{
    Address, AirdropClaim, Contribution, Difficulty, Referral, Task, TaskCompletion, TaskType,
    User,
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;

use crate::errors::Result;

#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub address: String,
    pub balance: i64,
    pub total_earned: i64,
    pub is_admin: bool,
    pub referral_code: String,
    pub referred_by: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub login_streak: i64,
    pub last_login: Option<NaiveDate>,
}

impl UserRow {
    pub fn into_user(self) -> Result<User> {
        Ok(User {
            address: Address::parse(&self.address)?,
            balance: self.balance,
            total_earned: self.total_earned,
            is_admin: self.is_admin,
            referral_code: self.referral_code,
            referred_by: self.referred_by.as_deref().map(Address::parse).transpose()?,
            joined_at: self.joined_at,
            login_streak: self.login_streak,
            last_login: self.last_login,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub reward: i64,
    pub difficulty: String,
    pub task_type: String,
    pub destination_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRow {
    pub fn into_task(self) -> Result<Task> {
        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            reward: self.reward,
            difficulty: self.difficulty.parse::<Difficulty>()?,
            task_type: self.task_type.parse::<TaskType>()?,
            destination_url: self.destination_url,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct CompletionRow {
    pub user_address: String,
    pub task_id: String,
    pub completed_at: DateTime<Utc>,
}

impl CompletionRow {
    pub fn into_completion(self) -> Result<TaskCompletion> {
        Ok(TaskCompletion {
            user_address: Address::parse(&self.user_address)?,
            task_id: self.task_id,
            completed_at: self.completed_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ReferralRow {
    pub referrer_address: String,
    pub referred_address: String,
    pub reward: i64,
    pub created_at: DateTime<Utc>,
}

impl ReferralRow {
    pub fn into_referral(self) -> Result<Referral> {
        Ok(Referral {
            referrer_address: Address::parse(&self.referrer_address)?,
            referred_address: Address::parse(&self.referred_address)?,
            reward: self.reward,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ContributionRow {
    pub id: i64,
    pub wallet_address: String,
    pub amount: f64,
    pub currency: String,
    pub tx_hash: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

impl ContributionRow {
    pub fn into_contribution(self) -> Result<Contribution> {
        Ok(Contribution {
            id: self.id,
            wallet_address: Address::parse(&self.wallet_address)?,
            amount: self.amount,
            currency: self.currency,
            tx_hash: self.tx_hash,
            approved: self.approved,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct AirdropClaimRow {
    pub wallet_address: String,
    pub paid: bool,
    pub payment_tx_hash: Option<String>,
    pub email: Option<String>,
    pub twitter_handle: Option<String>,
    pub telegram_handle: Option<String>,
    pub eligible: bool,
    pub created_at: DateTime<Utc>,
}

impl AirdropClaimRow {
    pub fn into_claim(self) -> Result<AirdropClaim> {
        Ok(AirdropClaim {
            wallet_address: Address::parse(&self.wallet_address)?,
            paid: self.paid,
            payment_tx_hash: self.payment_tx_hash,
            email: self.email,
            twitter_handle: self.twitter_handle,
            telegram_handle: self.telegram_handle,
            eligible: self.eligible,
            created_at: self.created_at,
        })
    }
}

/// Convert a batch of rows, failing on the first malformed one.
pub fn convert_all<R, T>(rows: Vec<R>, f: impl Fn(R) -> Result<T>) -> Result<Vec<T>> {
    rows.into_iter().map(f).collect()
}
