//! Database layer: migrations, queries and the ledger's atomic procedures.
//!
//! The procedures (`add_task_reward`, `add_referral_bonus`, `update_user_streak`,
//! `create_admin_user`) each run inside a single SQLite transaction. Uniqueness
//! constraints do the duplicate detection; a constraint that fires is reported as
//! a benign outcome where the caller expects one.

use bork_core::referral::{generate_referral_code, MAX_CODE_ATTEMPTS};
use bork_core::streak::{advance_streak, StreakUpdate};
use bork_core::validation::{progress_percent, ClaimDetails, ContributionInput, TaskInput};
use bork_core::wire::{
    AdminStats, CompletionStatus, ConnectResponse, FundraiserSummary, LeaderboardEntry,
    ReferralLeaderboardEntry, UserUpdate,
};
use bork_core::{
    Address, AirdropClaim, Contribution, CoreError, Difficulty, Referral, Task, TaskCompletion,
    TaskType, User,
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{sqlite::SqlitePoolOptions, Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::{info, warn};

use crate::errors::{Result, ServerError};
use crate::models::{
    convert_all, AirdropClaimRow, CompletionRow, ContributionRow, ReferralRow, TaskRow, UserRow,
};

/// Amounts credited by the ledger's procedures.
#[derive(Debug, Clone, Copy)]
pub struct LedgerSettings {
    pub referral_bonus: i64,
    pub streak_bonus: i64,
}

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    // An in-memory database lives and dies with its single connection.
    let options = if url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = options.connect(&url).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

/// Open a transaction holding SQLite's write lock from its first statement.
/// Concurrent writers wait on the busy timeout rather than failing with `SQLITE_BUSY`.
async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

// ─────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────

async fn user_by_address(conn: &mut SqliteConnection, address: &Address) -> Result<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT address, balance, total_earned, is_admin, referral_code, referred_by,
               joined_at, login_streak, last_login
        FROM   users
        WHERE  address = ?1
        "#,
    )
    .bind(address.as_str())
    .fetch_optional(&mut *conn)
    .await?;
    row.map(UserRow::into_user).transpose()
}

pub async fn get_user(pool: &SqlitePool, address: &Address) -> Result<Option<User>> {
    let mut conn = pool.acquire().await?;
    user_by_address(&mut conn, address).await
}

/// Resolve a `ref` parameter against user addresses and referral codes.
async fn find_referrer(conn: &mut SqliteConnection, reference: &str) -> Result<Option<User>> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Ok(None);
    }
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        SELECT address, balance, total_earned, is_admin, referral_code, referred_by,
               joined_at, login_streak, last_login
        FROM   users
        WHERE  lower(address) = lower(?1) OR lower(referral_code) = lower(?1)
        LIMIT  1
        "#,
    )
    .bind(reference)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(UserRow::into_user).transpose()
}

async fn unique_referral_code(conn: &mut SqliteConnection, address: &Address) -> Result<String> {
    for attempt in 0..MAX_CODE_ATTEMPTS {
        let code = generate_referral_code(address, attempt);
        let taken: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE referral_code = ?1")
            .bind(&code)
            .fetch_optional(&mut *conn)
            .await?;
        if taken.is_none() {
            return Ok(code);
        }
    }
    Err(CoreError::ReferralCodeExhausted(address.to_string()).into())
}

/// Credit `amount` to both the spendable balance and the lifetime total.
/// Returns the new balance.
async fn credit(conn: &mut SqliteConnection, address: &Address, amount: i64) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        UPDATE users
        SET    balance = balance + ?1, total_earned = total_earned + ?1
        WHERE  address = ?2
        RETURNING balance
        "#,
    )
    .bind(amount)
    .bind(address.as_str())
    .fetch_optional(&mut *conn)
    .await?;
    row.map(|(balance,)| balance)
        .ok_or_else(|| ServerError::NotFound(format!("user {address}")))
}

/// Resolve or create the account behind a wallet connection.
///
/// New accounts get a fresh referral code and, when `reference` resolves to
/// another user, are linked to that referrer who is credited the referral bonus.
/// Every connection then advances the login streak.
pub async fn connect_user(
    pool: &SqlitePool,
    address: &Address,
    reference: Option<&str>,
    now: DateTime<Utc>,
    settings: LedgerSettings,
) -> Result<ConnectResponse> {
    let mut tx = begin_write(pool).await?;

    let mut created = false;
    let mut referrer = None;

    if user_by_address(&mut tx, address).await?.is_none() {
        let code = unique_referral_code(&mut tx, address).await?;
        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO users (address, referral_code, joined_at) VALUES (?1, ?2, ?3)",
        )
        .bind(address.as_str())
        .bind(&code)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        created = inserted > 0;
        if created {
            info!("Created account {} with referral code {}", address, code);
            if let Some(reference) = reference {
                referrer =
                    link_referral(&mut tx, address, reference, now, settings.referral_bonus)
                        .await?;
            }
        }
    }

    let streak =
        update_user_streak(&mut tx, address, now.date_naive(), settings.streak_bonus).await?;

    let user = user_by_address(&mut tx, address)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("user {address}")))?;

    tx.commit().await?;

    let completed_task_ids = completed_task_ids(pool, address).await?;

    Ok(ConnectResponse {
        user,
        created,
        referrer,
        streak,
        completed_task_ids,
    })
}

/// Link `referred` to whoever `reference` points at. `referred_by` is write-once.
async fn link_referral(
    conn: &mut SqliteConnection,
    referred: &Address,
    reference: &str,
    now: DateTime<Utc>,
    bonus: i64,
) -> Result<Option<Address>> {
    let Some(referrer) = find_referrer(conn, reference).await? else {
        warn!("Referral reference {:?} matched no user", reference);
        return Ok(None);
    };

    if &referrer.address == referred {
        warn!("Ignoring self-referral for {}", referred);
        return Ok(None);
    }

    let linked = sqlx::query(
        "UPDATE users SET referred_by = ?1 WHERE address = ?2 AND referred_by IS NULL",
    )
    .bind(referrer.address.as_str())
    .bind(referred.as_str())
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if linked == 0 {
        return Ok(None);
    }

    sqlx::query(
        r#"
        INSERT INTO referrals (referrer_address, referred_address, reward, created_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(referrer.address.as_str())
    .bind(referred.as_str())
    .bind(bonus)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    add_referral_bonus(conn, &referrer.address, bonus).await?;
    info!(
        "{} referred by {} (+{} $BORK to referrer)",
        referred, referrer.address, bonus
    );

    Ok(Some(referrer.address))
}

/// `add_referral_bonus(referrer, amount)`
pub async fn add_referral_bonus(
    conn: &mut SqliteConnection,
    referrer: &Address,
    amount: i64,
) -> Result<()> {
    credit(conn, referrer, amount).await?;
    Ok(())
}

/// `update_user_streak(user)` for a login on `today`.
pub async fn update_user_streak(
    conn: &mut SqliteConnection,
    address: &Address,
    today: NaiveDate,
    daily_bonus: i64,
) -> Result<StreakUpdate> {
    let row: Option<(i64, Option<NaiveDate>)> =
        sqlx::query_as("SELECT login_streak, last_login FROM users WHERE address = ?1")
            .bind(address.as_str())
            .fetch_optional(&mut *conn)
            .await?;
    let (streak, last_login) =
        row.ok_or_else(|| ServerError::NotFound(format!("user {address}")))?;

    let update = advance_streak(last_login, streak, today, daily_bonus);
    if update.advanced {
        sqlx::query("UPDATE users SET login_streak = ?1, last_login = ?2 WHERE address = ?3")
            .bind(update.streak)
            .bind(today)
            .bind(address.as_str())
            .execute(&mut *conn)
            .await?;
        if update.bonus > 0 {
            credit(conn, address, update.bonus).await?;
        }
    }
    Ok(update)
}

/// `create_admin_user()`: promote (or create) the configured admin wallet.
pub async fn create_admin_user(
    pool: &SqlitePool,
    address: &Address,
    now: DateTime<Utc>,
) -> Result<User> {
    let mut tx = begin_write(pool).await?;

    if user_by_address(&mut tx, address).await?.is_some() {
        sqlx::query("UPDATE users SET is_admin = 1 WHERE address = ?1")
            .bind(address.as_str())
            .execute(&mut *tx)
            .await?;
    } else {
        let code = unique_referral_code(&mut tx, address).await?;
        sqlx::query(
            "INSERT INTO users (address, referral_code, joined_at, is_admin) VALUES (?1, ?2, ?3, 1)",
        )
        .bind(address.as_str())
        .bind(&code)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    let user = user_by_address(&mut tx, address)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("user {address}")))?;
    tx.commit().await?;
    Ok(user)
}

/// Admin correction of a user record.
pub async fn update_user(pool: &SqlitePool, address: &Address, update: &UserUpdate) -> Result<User> {
    if update.balance.is_some_and(|b| b < 0) {
        return Err(CoreError::Validation("Balance must not be negative".to_string()).into());
    }

    let rows = sqlx::query(
        r#"
        UPDATE users
        SET    balance = COALESCE(?1, balance), is_admin = COALESCE(?2, is_admin)
        WHERE  address = ?3
        "#,
    )
    .bind(update.balance)
    .bind(update.is_admin)
    .bind(address.as_str())
    .execute(pool)
    .await?
    .rows_affected();

    if rows == 0 {
        return Err(ServerError::NotFound(format!("user {address}")));
    }

    get_user(pool, address)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("user {address}")))
}

pub async fn delete_user(pool: &SqlitePool, address: &Address) -> Result<()> {
    let rows = sqlx::query("DELETE FROM users WHERE address = ?1")
        .bind(address.as_str())
        .execute(pool)
        .await?
        .rows_affected();
    if rows == 0 {
        return Err(ServerError::NotFound(format!("user {address}")));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Tasks
// ─────────────────────────────────────────────────────────

pub async fn list_tasks(pool: &SqlitePool) -> Result<Vec<Task>> {
    let rows = sqlx::query_as::<_, TaskRow>(
        r#"
        SELECT id, title, description, reward, difficulty, task_type, destination_url,
               created_at, updated_at
        FROM   tasks
        ORDER  BY created_at ASC, CAST(id AS INTEGER) ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    convert_all(rows, TaskRow::into_task)
}

pub async fn get_task(pool: &SqlitePool, task_id: &str) -> Result<Option<Task>> {
    let row = sqlx::query_as::<_, TaskRow>(
        r#"
        SELECT id, title, description, reward, difficulty, task_type, destination_url,
               created_at, updated_at
        FROM   tasks
        WHERE  id = ?1
        "#,
    )
    .bind(task_id)
    .fetch_optional(pool)
    .await?;
    row.map(TaskRow::into_task).transpose()
}

pub async fn create_task(pool: &SqlitePool, input: &TaskInput, now: DateTime<Utc>) -> Result<Task> {
    input.validate()?;

    let mut tx = begin_write(pool).await?;
    let (next_id,): (i64,) =
        sqlx::query_as("SELECT COALESCE(MAX(CAST(id AS INTEGER)), 0) + 1 FROM tasks")
            .fetch_one(&mut *tx)
            .await?;
    let id = next_id.to_string();

    sqlx::query(
        r#"
        INSERT INTO tasks
            (id, title, description, reward, difficulty, task_type, destination_url,
             created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
        "#,
    )
    .bind(&id)
    .bind(input.title.trim())
    .bind(input.description.trim())
    .bind(input.reward)
    .bind(input.difficulty.as_str())
    .bind(input.task_type.as_str())
    .bind(&input.destination_url)
    .bind(now)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    info!("Created task {} ({:?}, +{})", id, input.title, input.reward);
    get_task(pool, &id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("task {id}")))
}

pub async fn update_task(
    pool: &SqlitePool,
    task_id: &str,
    input: &TaskInput,
    now: DateTime<Utc>,
) -> Result<Task> {
    input.validate()?;

    let rows = sqlx::query(
        r#"
        UPDATE tasks
        SET    title = ?1, description = ?2, reward = ?3, difficulty = ?4, task_type = ?5,
               destination_url = ?6, updated_at = ?7
        WHERE  id = ?8
        "#,
    )
    .bind(input.title.trim())
    .bind(input.description.trim())
    .bind(input.reward)
    .bind(input.difficulty.as_str())
    .bind(input.task_type.as_str())
    .bind(&input.destination_url)
    .bind(now)
    .bind(task_id)
    .execute(pool)
    .await?
    .rows_affected();

    if rows == 0 {
        return Err(ServerError::NotFound(format!("task {task_id}")));
    }
    get_task(pool, task_id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("task {task_id}")))
}

pub async fn delete_task(pool: &SqlitePool, task_id: &str) -> Result<()> {
    let rows = sqlx::query("DELETE FROM tasks WHERE id = ?1")
        .bind(task_id)
        .execute(pool)
        .await?
        .rows_affected();
    if rows == 0 {
        return Err(ServerError::NotFound(format!("task {task_id}")));
    }
    Ok(())
}

/// The launch task list, inserted when the tasks table is empty.
pub fn default_tasks() -> Vec<TaskInput> {
    let task = |title: &str, description: &str, reward, difficulty, task_type, url: Option<&str>| {
        TaskInput {
            title: title.to_string(),
            description: description.to_string(),
            reward,
            difficulty,
            task_type,
            destination_url: url.map(str::to_string),
        }
    };
    vec![
        task(
            "Follow BorkChain on Twitter",
            "Follow our official Twitter account to stay updated",
            50,
            Difficulty::Easy,
            TaskType::OneTime,
            Some("https://twitter.com/BorkChain"),
        ),
        task(
            "Join Discord Community",
            "Join our vibrant Discord community and say hello",
            75,
            Difficulty::Easy,
            TaskType::OneTime,
            Some("https://discord.gg/borkchain"),
        ),
        task(
            "Refer a Friend",
            "Invite a friend to join BorkChain with your referral link",
            150,
            Difficulty::Medium,
            TaskType::OneTime,
            None,
        ),
        task(
            "Participate in AMA",
            "Join our weekly AMA session with the team",
            100,
            Difficulty::Medium,
            TaskType::Weekly,
            Some("https://discord.gg/borkchain-ama"),
        ),
        task(
            "Create Meme Content",
            "Create and share a BORK-themed meme on social media",
            200,
            Difficulty::Hard,
            TaskType::Daily,
            Some("https://twitter.com/intent/tweet?hashtags=BorkChain"),
        ),
    ]
}

/// Seed the default tasks into an empty table. Returns how many were inserted.
pub async fn seed_default_tasks(pool: &SqlitePool, now: DateTime<Utc>) -> Result<usize> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(0);
    }

    let defaults = default_tasks();
    for input in &defaults {
        create_task(pool, input, now).await?;
    }
    Ok(defaults.len())
}

// ─────────────────────────────────────────────────────────
// Task completion
// ─────────────────────────────────────────────────────────

/// `add_task_reward(user, task)`: record the completion and credit the reward
/// exactly once per (user, task).
pub async fn add_task_reward(
    conn: &mut SqliteConnection,
    address: &Address,
    task_id: &str,
    now: DateTime<Utc>,
) -> Result<CompletionStatus> {
    let (reward,): (i64,) = sqlx::query_as("SELECT reward FROM tasks WHERE id = ?1")
        .bind(task_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("task {task_id}")))?;

    let (balance,): (i64,) = sqlx::query_as("SELECT balance FROM users WHERE address = ?1")
        .bind(address.as_str())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("user {address}")))?;

    let inserted = sqlx::query(
        "INSERT OR IGNORE INTO user_tasks (user_address, task_id, completed_at) VALUES (?1, ?2, ?3)",
    )
    .bind(address.as_str())
    .bind(task_id)
    .bind(now)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    if inserted == 0 {
        return Ok(CompletionStatus::AlreadyCompleted { balance });
    }

    let balance = credit(conn, address, reward).await?;
    Ok(CompletionStatus::Credited { reward, balance })
}

pub async fn complete_task(
    pool: &SqlitePool,
    address: &Address,
    task_id: &str,
    now: DateTime<Utc>,
) -> Result<CompletionStatus> {
    let mut tx = begin_write(pool).await?;
    let status = add_task_reward(&mut tx, address, task_id, now).await?;
    tx.commit().await?;

    match status {
        CompletionStatus::Credited { reward, .. } => {
            info!("{} completed task {} (+{} $BORK)", address, task_id, reward)
        }
        CompletionStatus::AlreadyCompleted { .. } => {
            warn!("{} already completed task {}", address, task_id)
        }
    }
    Ok(status)
}

pub async fn completions_for(pool: &SqlitePool, address: &Address) -> Result<Vec<TaskCompletion>> {
    let rows = sqlx::query_as::<_, CompletionRow>(
        r#"
        SELECT user_address, task_id, completed_at
        FROM   user_tasks
        WHERE  user_address = ?1
        ORDER  BY completed_at ASC, id ASC
        "#,
    )
    .bind(address.as_str())
    .fetch_all(pool)
    .await?;
    convert_all(rows, CompletionRow::into_completion)
}

pub async fn completed_task_ids(pool: &SqlitePool, address: &Address) -> Result<Vec<String>> {
    Ok(completions_for(pool, address)
        .await?
        .into_iter()
        .map(|c| c.task_id)
        .collect())
}

// ─────────────────────────────────────────────────────────
// Referrals & leaderboards
// ─────────────────────────────────────────────────────────

pub async fn referrals_by(pool: &SqlitePool, referrer: &Address) -> Result<Vec<Referral>> {
    let rows = sqlx::query_as::<_, ReferralRow>(
        r#"
        SELECT referrer_address, referred_address, reward, created_at
        FROM   referrals
        WHERE  referrer_address = ?1
        ORDER  BY created_at ASC, id ASC
        "#,
    )
    .bind(referrer.as_str())
    .fetch_all(pool)
    .await?;
    convert_all(rows, ReferralRow::into_referral)
}

pub async fn leaderboard(pool: &SqlitePool, limit: u32) -> Result<Vec<LeaderboardEntry>> {
    let rows = sqlx::query_as::<_, (String, i64, i64)>(
        r#"
        SELECT address, balance, total_earned
        FROM   users
        ORDER  BY total_earned DESC, joined_at ASC, address ASC
        LIMIT  ?1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .zip(1u32..)
        .map(|((address, balance, total_earned), rank)| -> Result<LeaderboardEntry> {
            Ok(LeaderboardEntry {
                rank,
                address: Address::parse(&address)?,
                balance,
                total_earned,
            })
        })
        .collect()
}

pub async fn referral_leaderboard(
    pool: &SqlitePool,
    limit: u32,
) -> Result<Vec<ReferralLeaderboardEntry>> {
    let rows = sqlx::query_as::<_, (String, i64, i64)>(
        r#"
        SELECT referrer_address, COUNT(*) AS referrals, COALESCE(SUM(reward), 0) AS earned
        FROM   referrals
        GROUP  BY referrer_address
        ORDER  BY referrals DESC, earned DESC, referrer_address ASC
        LIMIT  ?1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .zip(1u32..)
        .map(|((address, referrals, earned), rank)| -> Result<ReferralLeaderboardEntry> {
            Ok(ReferralLeaderboardEntry {
                rank,
                address: Address::parse(&address)?,
                referrals,
                earned,
            })
        })
        .collect()
}

// ─────────────────────────────────────────────────────────
// Fundraiser contributions
// ─────────────────────────────────────────────────────────

async fn get_contribution(pool: &SqlitePool, id: i64) -> Result<Option<Contribution>> {
    let row = sqlx::query_as::<_, ContributionRow>(
        r#"
        SELECT id, wallet_address, amount, currency, tx_hash, approved, created_at
        FROM   presale_contributions
        WHERE  id = ?1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(ContributionRow::into_contribution).transpose()
}

/// Record a contribution for review. It does not touch any balance.
pub async fn insert_contribution(
    pool: &SqlitePool,
    address: &Address,
    input: &ContributionInput,
    now: DateTime<Utc>,
) -> Result<Contribution> {
    input.validate()?;

    let result = sqlx::query(
        r#"
        INSERT INTO presale_contributions
            (wallet_address, amount, currency, tx_hash, approved, created_at)
        VALUES (?1, ?2, ?3, ?4, 0, ?5)
        "#,
    )
    .bind(address.as_str())
    .bind(input.amount)
    .bind(&input.currency)
    .bind(input.tx_hash.trim())
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => ServerError::Conflict(
            format!("Transaction {} was already submitted", input.tx_hash.trim()),
        ),
        other => other.into(),
    })?;

    let id = result.last_insert_rowid();
    info!(
        "Contribution #{} from {}: {} {}",
        id, address, input.amount, input.currency
    );
    get_contribution(pool, id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("contribution {id}")))
}

pub async fn list_contributions(
    pool: &SqlitePool,
    wallet: Option<&Address>,
) -> Result<Vec<Contribution>> {
    let rows = match wallet {
        Some(wallet) => {
            sqlx::query_as::<_, ContributionRow>(
                r#"
                SELECT id, wallet_address, amount, currency, tx_hash, approved, created_at
                FROM   presale_contributions
                WHERE  wallet_address = ?1
                ORDER  BY created_at DESC, id DESC
                "#,
            )
            .bind(wallet.as_str())
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, ContributionRow>(
                r#"
                SELECT id, wallet_address, amount, currency, tx_hash, approved, created_at
                FROM   presale_contributions
                ORDER  BY created_at DESC, id DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };
    convert_all(rows, ContributionRow::into_contribution)
}

pub async fn approve_contribution(pool: &SqlitePool, id: i64) -> Result<Contribution> {
    let rows = sqlx::query("UPDATE presale_contributions SET approved = 1 WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();
    if rows == 0 {
        return Err(ServerError::NotFound(format!("contribution {id}")));
    }
    info!("Contribution #{} approved", id);
    get_contribution(pool, id)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("contribution {id}")))
}

/// Cumulative approved contributions for one wallet.
pub async fn approved_total_for(pool: &SqlitePool, address: &Address) -> Result<f64> {
    let (total,): (f64,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(amount), 0.0)
        FROM   presale_contributions
        WHERE  wallet_address = ?1 AND approved = 1
        "#,
    )
    .bind(address.as_str())
    .fetch_one(pool)
    .await?;
    Ok(total)
}

pub async fn fundraiser_summary(pool: &SqlitePool, target: f64) -> Result<FundraiserSummary> {
    let (total_raised, contributors): (f64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(amount), 0.0), COUNT(DISTINCT wallet_address)
        FROM   presale_contributions
        WHERE  approved = 1
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(FundraiserSummary {
        total_raised,
        target,
        progress_percent: progress_percent(total_raised, target),
        contributors,
    })
}

// ─────────────────────────────────────────────────────────
// Airdrop claims
// ─────────────────────────────────────────────────────────

pub async fn get_airdrop_claim(pool: &SqlitePool, address: &Address) -> Result<Option<AirdropClaim>> {
    let row = sqlx::query_as::<_, AirdropClaimRow>(
        r#"
        SELECT wallet_address, paid, payment_tx_hash, email, twitter_handle, telegram_handle,
               eligible, created_at
        FROM   airdrop_claims
        WHERE  wallet_address = ?1
        "#,
    )
    .bind(address.as_str())
    .fetch_optional(pool)
    .await?;
    row.map(AirdropClaimRow::into_claim).transpose()
}

/// Record the premier-pass payment for a wallet (upsert on the wallet).
pub async fn record_airdrop_payment(
    pool: &SqlitePool,
    address: &Address,
    tx_hash: &str,
    now: DateTime<Utc>,
) -> Result<AirdropClaim> {
    bork_core::validation::validate_tx_hash(tx_hash)?;

    sqlx::query(
        r#"
        INSERT INTO airdrop_claims (wallet_address, paid, payment_tx_hash, created_at)
        VALUES (?1, 1, ?2, ?3)
        ON CONFLICT (wallet_address)
        DO UPDATE SET paid = 1, payment_tx_hash = excluded.payment_tx_hash
        "#,
    )
    .bind(address.as_str())
    .bind(tx_hash.trim())
    .bind(now)
    .execute(pool)
    .await?;

    get_airdrop_claim(pool, address)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("airdrop claim {address}")))
}

/// Attach contact details to a paid claim.
pub async fn submit_airdrop_claim(
    pool: &SqlitePool,
    address: &Address,
    details: ClaimDetails,
) -> Result<AirdropClaim> {
    let details = details.normalized();
    details.validate()?;

    let rows = sqlx::query(
        r#"
        UPDATE airdrop_claims
        SET    email = ?1, twitter_handle = ?2, telegram_handle = ?3
        WHERE  wallet_address = ?4 AND paid = 1
        "#,
    )
    .bind(&details.email)
    .bind(&details.twitter_handle)
    .bind(&details.telegram_handle)
    .bind(address.as_str())
    .execute(pool)
    .await?
    .rows_affected();

    if rows == 0 {
        return Err(ServerError::Conflict(
            "A premier pass payment is required before claiming".to_string(),
        ));
    }

    get_airdrop_claim(pool, address)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("airdrop claim {address}")))
}

// ─────────────────────────────────────────────────────────
// Admin dashboard
// ─────────────────────────────────────────────────────────

pub async fn admin_stats(pool: &SqlitePool) -> Result<AdminStats> {
    let (users, total_distributed): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(total_earned), 0) FROM users")
            .fetch_one(pool)
            .await?;
    let (tasks,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
        .fetch_one(pool)
        .await?;
    let (completions,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_tasks")
        .fetch_one(pool)
        .await?;
    let (total_raised, pending_contributions): (f64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(CASE WHEN approved = 1 THEN amount ELSE 0.0 END), 0.0),
               COALESCE(SUM(CASE WHEN approved = 0 THEN 1 ELSE 0 END), 0)
        FROM   presale_contributions
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(AdminStats {
        users,
        tasks,
        completions,
        total_distributed,
        total_raised,
        pending_contributions,
    })
}
