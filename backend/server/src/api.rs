//! Axum REST API handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use bork_core::badge::classify;
use bork_core::validation::TaskInput;
use bork_core::wire::{
    AdminLoginRequest, AdminLoginResponse, AdminStats, AirdropClaimRequest,
    AirdropPaymentRequest, BadgeSummary, CompleteTaskRequest, CompleteTaskResponse,
    ConnectRequest, ConnectResponse, ContributionRequest, FundraiserSummary, LeaderboardEntry,
    ReferralLeaderboardEntry, UserProfile, UserUpdate,
};
use bork_core::{
    Address, AirdropClaim, BadgeInfo, Contribution, Referral, Task, TaskCompletion, User,
    BADGE_TIERS,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::db;
use crate::errors::{Result, ServerError};
use crate::state::AppState;

const DEFAULT_LEADERBOARD_LIMIT: u32 = 100;
const MAX_LEADERBOARD_LIMIT: u32 = 500;

// ─────────────────────────────────────────────────────────
// Request & response shapes
// ─────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u32>,
}

impl LimitQuery {
    fn clamped(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_LEADERBOARD_LIMIT)
            .clamp(1, MAX_LEADERBOARD_LIMIT)
    }
}

#[derive(Deserialize)]
pub struct ContributionQuery {
    pub address: Option<String>,
}

#[derive(Deserialize)]
pub struct ClassifyQuery {
    pub amount: f64,
}

fn parse_address(raw: &str) -> Result<Address> {
    Ok(Address::parse(raw)?)
}

async fn require_user(state: &AppState, address: &Address) -> Result<User> {
    db::get_user(&state.pool, address)
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("user {address}")))
}

// ─────────────────────────────────────────────────────────
// Public handlers
// ─────────────────────────────────────────────────────────

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /wallet/connect`
///
/// Creates the account on first connection, applies the `ref` referral for new
/// accounts, and advances the login streak.
pub async fn connect_wallet(
    State(state): State<AppState>,
    Json(request): Json<ConnectRequest>,
) -> Result<Json<ConnectResponse>> {
    let response = db::connect_user(
        &state.pool,
        &request.address,
        request.referral.as_deref(),
        Utc::now(),
        state.ledger_settings(),
    )
    .await?;
    Ok(Json(response))
}

/// `GET /users/:address`
pub async fn get_user_profile(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<UserProfile>> {
    let address = parse_address(&address)?;
    let user = require_user(&state, &address).await?;
    let completed_task_ids = db::completed_task_ids(&state.pool, &address).await?;
    let referrals = db::referrals_by(&state.pool, &address).await?;
    Ok(Json(UserProfile {
        user,
        completed_task_ids,
        referrals,
    }))
}

/// `GET /users/:address/tasks`
pub async fn get_user_tasks(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<TaskCompletion>>> {
    let address = parse_address(&address)?;
    require_user(&state, &address).await?;
    Ok(Json(db::completions_for(&state.pool, &address).await?))
}

/// `GET /users/:address/referrals`
pub async fn get_user_referrals(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<Vec<Referral>>> {
    let address = parse_address(&address)?;
    require_user(&state, &address).await?;
    Ok(Json(db::referrals_by(&state.pool, &address).await?))
}

/// `GET /users/:address/badge`
///
/// Badge for the wallet's cumulative approved contributions.
pub async fn get_user_badge(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<BadgeSummary>> {
    let address = parse_address(&address)?;
    let total = db::approved_total_for(&state.pool, &address).await?;
    Ok(Json(BadgeSummary::new(total, classify(total))))
}

/// `GET /tasks`
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<Task>>> {
    Ok(Json(db::list_tasks(&state.pool).await?))
}

/// `POST /tasks/:id/complete`
///
/// Credits the reward once; repeating the call reports `already_completed`.
pub async fn complete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<CompleteTaskRequest>,
) -> Result<Json<CompleteTaskResponse>> {
    let status = db::complete_task(&state.pool, &request.address, &task_id, Utc::now()).await?;
    Ok(Json(CompleteTaskResponse { task_id, status }))
}

/// `GET /contributions?address=`
pub async fn list_contributions(
    State(state): State<AppState>,
    Query(query): Query<ContributionQuery>,
) -> Result<Json<Vec<Contribution>>> {
    let wallet = query.address.as_deref().map(parse_address).transpose()?;
    Ok(Json(
        db::list_contributions(&state.pool, wallet.as_ref()).await?,
    ))
}

/// `POST /contributions`
pub async fn submit_contribution(
    State(state): State<AppState>,
    Json(request): Json<ContributionRequest>,
) -> Result<(StatusCode, Json<Contribution>)> {
    let contribution =
        db::insert_contribution(&state.pool, &request.address, &request.input, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(contribution)))
}

/// `GET /fundraiser`
pub async fn get_fundraiser(State(state): State<AppState>) -> Result<Json<FundraiserSummary>> {
    Ok(Json(
        db::fundraiser_summary(&state.pool, state.config.fundraiser_target).await?,
    ))
}

/// `GET /badges`
pub async fn list_badges() -> Json<&'static [BadgeInfo]> {
    Json(BADGE_TIERS.as_slice())
}

/// `GET /badges/classify?amount=`
pub async fn classify_badge(Query(query): Query<ClassifyQuery>) -> Json<BadgeSummary> {
    Json(BadgeSummary::new(query.amount, classify(query.amount)))
}

/// `GET /leaderboard?limit=`
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    Ok(Json(db::leaderboard(&state.pool, query.clamped()).await?))
}

/// `GET /leaderboard/referrals?limit=`
pub async fn referral_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ReferralLeaderboardEntry>>> {
    Ok(Json(
        db::referral_leaderboard(&state.pool, query.clamped()).await?,
    ))
}

/// `POST /airdrop/payment`
pub async fn airdrop_payment(
    State(state): State<AppState>,
    Json(request): Json<AirdropPaymentRequest>,
) -> Result<Json<AirdropClaim>> {
    let claim =
        db::record_airdrop_payment(&state.pool, &request.address, &request.tx_hash, Utc::now())
            .await?;
    Ok(Json(claim))
}

/// `PUT /airdrop/claim`
pub async fn airdrop_claim(
    State(state): State<AppState>,
    Json(request): Json<AirdropClaimRequest>,
) -> Result<Json<AirdropClaim>> {
    let claim = db::submit_airdrop_claim(&state.pool, &request.address, request.details).await?;
    Ok(Json(claim))
}

/// `GET /airdrop/:address`
pub async fn get_airdrop(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AirdropClaim>> {
    let address = parse_address(&address)?;
    db::get_airdrop_claim(&state.pool, &address)
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("airdrop claim {address}")))
}

// ─────────────────────────────────────────────────────────
// Admin handlers
// ─────────────────────────────────────────────────────────

/// `POST /admin/login`
pub async fn admin_login(
    State(state): State<AppState>,
    Json(request): Json<AdminLoginRequest>,
) -> Result<Json<AdminLoginResponse>> {
    Ok(Json(auth::login(&state, &request, Utc::now()).await?))
}

/// `POST /admin/tasks`
pub async fn create_task(
    State(state): State<AppState>,
    Json(input): Json<TaskInput>,
) -> Result<(StatusCode, Json<Task>)> {
    let task = db::create_task(&state.pool, &input, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `PUT /admin/tasks/:id`
pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(input): Json<TaskInput>,
) -> Result<Json<Task>> {
    Ok(Json(
        db::update_task(&state.pool, &task_id, &input, Utc::now()).await?,
    ))
}

/// `DELETE /admin/tasks/:id`
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<StatusCode> {
    db::delete_task(&state.pool, &task_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PUT /admin/users/:address`
pub async fn update_user(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Json(update): Json<UserUpdate>,
) -> Result<Json<User>> {
    let address = parse_address(&address)?;
    Ok(Json(db::update_user(&state.pool, &address, &update).await?))
}

/// `DELETE /admin/users/:address`
pub async fn delete_user(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<StatusCode> {
    let address = parse_address(&address)?;
    db::delete_user(&state.pool, &address).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /admin/contributions/:id/approve`
pub async fn approve_contribution(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Contribution>> {
    Ok(Json(db::approve_contribution(&state.pool, id).await?))
}

/// `GET /admin/stats`
pub async fn admin_stats(State(state): State<AppState>) -> Result<Json<AdminStats>> {
    Ok(Json(db::admin_stats(&state.pool).await?))
}
