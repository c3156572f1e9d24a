//! Router construction.

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::auth;
use crate::state::AppState;

/// Build the full application router, middleware included.
pub fn create_router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/tasks", post(api::create_task))
        .route("/tasks/:id", put(api::update_task).delete(api::delete_task))
        .route(
            "/users/:address",
            put(api::update_user).delete(api::delete_user),
        )
        .route(
            "/contributions/:id/approve",
            post(api::approve_contribution),
        )
        .route("/stats", get(api::admin_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ))
        // Login sits outside the guard.
        .route("/login", post(api::admin_login));

    let enable_cors = state.config.enable_cors;

    let mut router = Router::new()
        .route("/health", get(api::health))
        // Wallet & users
        .route("/wallet/connect", post(api::connect_wallet))
        .route("/users/:address", get(api::get_user_profile))
        .route("/users/:address/tasks", get(api::get_user_tasks))
        .route("/users/:address/referrals", get(api::get_user_referrals))
        .route("/users/:address/badge", get(api::get_user_badge))
        // Tasks
        .route("/tasks", get(api::list_tasks))
        .route("/tasks/:id/complete", post(api::complete_task))
        // Fundraiser
        .route(
            "/contributions",
            get(api::list_contributions).post(api::submit_contribution),
        )
        .route("/fundraiser", get(api::get_fundraiser))
        .route("/badges", get(api::list_badges))
        .route("/badges/classify", get(api::classify_badge))
        // Leaderboards
        .route("/leaderboard", get(api::leaderboard))
        .route("/leaderboard/referrals", get(api::referral_leaderboard))
        // Airdrop
        .route("/airdrop/payment", post(api::airdrop_payment))
        .route("/airdrop/claim", put(api::airdrop_claim))
        .route("/airdrop/:address", get(api::get_airdrop))
        .nest("/admin", admin)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router
}
