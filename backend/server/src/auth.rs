//! Admin login and bearer-token sessions.
//!
//! Credentials come from [`Config`](crate::config::Config). A successful login
//! issues a random token that stays valid for
//! [`ADMIN_SESSION_TTL_HOURS`](bork_core::admin::ADMIN_SESSION_TTL_HOURS).

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use bork_core::admin::AdminSession;
use bork_core::wire::{AdminLoginRequest, AdminLoginResponse};
use chrono::{DateTime, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::errors::{Result, ServerError};
use crate::state::AppState;

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

fn new_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Check credentials and open a session.
pub async fn login(
    state: &AppState,
    request: &AdminLoginRequest,
    now: DateTime<Utc>,
) -> Result<AdminLoginResponse> {
    // Compare digests so the comparison length never depends on the input.
    let username_ok = digest(&request.username) == digest(&state.config.admin_username);
    let password_ok = digest(&request.password) == digest(&state.config.admin_password);
    if !(username_ok && password_ok) {
        warn!("Rejected admin login for {:?}", request.username);
        return Err(ServerError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let session = AdminSession::new(request.username.clone(), now);
    let expires_at = session.expires_at();
    let token = new_token();

    let mut sessions = state.sessions.write().await;
    sessions.retain(|_, s| s.is_valid(now));
    sessions.insert(token.clone(), session);
    info!("Admin {} logged in", request.username);

    Ok(AdminLoginResponse { token, expires_at })
}

/// Resolve a bearer token to a live session.
pub async fn authorize(state: &AppState, token: &str, now: DateTime<Utc>) -> Result<AdminSession> {
    let sessions = state.sessions.read().await;
    match sessions.get(token) {
        Some(session) if session.is_valid(now) => Ok(session.clone()),
        Some(_) => Err(ServerError::Unauthorized("Session expired".to_string())),
        None => Err(ServerError::Unauthorized("Invalid session token".to_string())),
    }
}

/// Middleware guarding the `/admin` routes.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(|| ServerError::Unauthorized("Missing bearer token".to_string()))?;

    authorize(&state, token, Utc::now()).await?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use chrono::Duration;

    async fn test_state() -> AppState {
        let pool = crate::db::init_pool("sqlite::memory:").await.unwrap();
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            referral_bonus: 100,
            streak_bonus: 10,
            admin_username: "admin".to_string(),
            admin_password: "correct-horse".to_string(),
            admin_address: None,
            fundraiser_target: 100_000.0,
            enable_cors: false,
        };
        AppState::new(pool, config)
    }

    fn credentials(password: &str) -> AdminLoginRequest {
        AdminLoginRequest {
            username: "admin".to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_issues_token() {
        let state = test_state().await;
        let now = Utc::now();
        let resp = login(&state, &credentials("correct-horse"), now).await.unwrap();

        assert_eq!(resp.token.len(), 64);
        assert_eq!(resp.expires_at, now + Duration::hours(24));
        assert!(authorize(&state, &resp.token, now).await.is_ok());
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let state = test_state().await;
        let result = login(&state, &credentials("wrong"), Utc::now()).await;
        assert!(matches!(result, Err(ServerError::Unauthorized(_))));
        assert!(state.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_session_expires() {
        let state = test_state().await;
        let now = Utc::now();
        let resp = login(&state, &credentials("correct-horse"), now).await.unwrap();

        let later = now + Duration::hours(25);
        assert!(authorize(&state, &resp.token, later).await.is_err());
        assert!(authorize(&state, "not-a-token", now).await.is_err());
    }
}
