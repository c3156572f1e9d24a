//! Integration tests for the BorkChain REST API.

use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use bork_server::{create_router, db, AppState, Config};
use chrono::Utc;
use serde_json::{json, Value};

const ALICE: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
const BOB: &str = "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
const CAROL: &str = "0xcccccccccccccccccccccccccccccccccccccccc";

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        referral_bonus: 100,
        streak_bonus: 10,
        admin_username: "admin".to_string(),
        admin_password: "correct-horse".to_string(),
        admin_address: None,
        fundraiser_target: 100_000.0,
        enable_cors: false,
    }
}

async fn create_test_server() -> TestServer {
    let pool = db::init_pool("sqlite::memory:").await.unwrap();
    db::seed_default_tasks(&pool, Utc::now()).await.unwrap();
    let router = create_router(AppState::new(pool, test_config()));
    TestServer::new(router).unwrap()
}

async fn connect(server: &TestServer, address: &str, reference: Option<&str>) -> Value {
    let mut body = json!({ "address": address });
    if let Some(reference) = reference {
        body["ref"] = json!(reference);
    }
    let response = server.post("/wallet/connect").json(&body).await;
    response.assert_status_ok();
    response.json()
}

async fn admin_token(server: &TestServer) -> HeaderValue {
    let response = server
        .post("/admin/login")
        .json(&json!({ "username": "admin", "password": "correct-horse" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    HeaderValue::from_str(&format!("Bearer {}", body["token"].as_str().unwrap())).unwrap()
}

// ============ Health ============

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server().await;
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

// ============ Wallet & tasks ============

#[tokio::test]
async fn test_connect_creates_user() {
    let server = create_test_server().await;
    let body = connect(&server, ALICE, None).await;

    assert_eq!(body["created"], true);
    assert_eq!(body["user"]["address"], ALICE);
    assert_eq!(body["user"]["balance"], 10);
    assert_eq!(body["streak"]["streak"], 1);
    assert!(body["user"]["referral_code"]
        .as_str()
        .unwrap()
        .starts_with("BORK"));
}

#[tokio::test]
async fn test_connect_rejects_bad_address() {
    let server = create_test_server().await;
    let response = server.get("/users/not-an-address").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_list_tasks_seeded() {
    let server = create_test_server().await;
    let response = server.get("/tasks").await;
    response.assert_status_ok();
    let tasks: Value = response.json();
    assert_eq!(tasks.as_array().unwrap().len(), 5);
    assert_eq!(tasks[0]["id"], "1");
    assert_eq!(tasks[0]["reward"], 50);
}

#[tokio::test]
async fn test_complete_task_credits_once() {
    let server = create_test_server().await;
    connect(&server, ALICE, None).await;

    let first = server
        .post("/tasks/1/complete")
        .json(&json!({ "address": ALICE }))
        .await;
    first.assert_status_ok();
    let first: Value = first.json();
    assert_eq!(first["status"], "credited");
    assert_eq!(first["reward"], 50);
    assert_eq!(first["balance"], 60);

    let second = server
        .post("/tasks/1/complete")
        .json(&json!({ "address": ALICE }))
        .await;
    second.assert_status_ok();
    let second: Value = second.json();
    assert_eq!(second["status"], "already_completed");
    assert_eq!(second["balance"], 60);

    let profile: Value = server.get(&format!("/users/{ALICE}")).await.json();
    assert_eq!(profile["user"]["balance"], 60);
    assert_eq!(profile["completed_task_ids"], json!(["1"]));
}

#[tokio::test]
async fn test_complete_unknown_task() {
    let server = create_test_server().await;
    connect(&server, ALICE, None).await;
    let response = server
        .post("/tasks/404/complete")
        .json(&json!({ "address": ALICE }))
        .await;
    response.assert_status_not_found();
}

// ============ Referrals ============

#[tokio::test]
async fn test_referral_flow() {
    let server = create_test_server().await;
    let alice = connect(&server, ALICE, None).await;
    let code = alice["user"]["referral_code"].as_str().unwrap().to_lowercase();

    let bob = connect(&server, BOB, Some(&code)).await;
    assert_eq!(bob["referrer"], ALICE);
    assert_eq!(bob["user"]["referred_by"], ALICE);

    let profile: Value = server.get(&format!("/users/{ALICE}")).await.json();
    assert_eq!(profile["user"]["balance"], 110);

    // A second reference on reconnect changes nothing.
    let carol = connect(&server, CAROL, None).await;
    let carol_code = carol["user"]["referral_code"].as_str().unwrap().to_string();
    let again = connect(&server, BOB, Some(&carol_code)).await;
    assert_eq!(again["user"]["referred_by"], ALICE);

    let referrals: Value = server
        .get(&format!("/users/{ALICE}/referrals"))
        .await
        .json();
    assert_eq!(referrals.as_array().unwrap().len(), 1);

    let board: Value = server.get("/leaderboard/referrals").await.json();
    assert_eq!(board[0]["address"], ALICE);
    assert_eq!(board[0]["referrals"], 1);
}

// ============ Fundraiser & badges ============

#[tokio::test]
async fn test_contribution_lifecycle() {
    let server = create_test_server().await;
    let request = json!({
        "address": ALICE,
        "amount": 250.0,
        "currency": "USDT",
        "tx_hash": "0xdeadbeefcafe0001"
    });

    let response = server.post("/contributions").json(&request).await;
    response.assert_status(StatusCode::CREATED);
    let contribution: Value = response.json();
    assert_eq!(contribution["approved"], false);
    let id = contribution["id"].as_i64().unwrap();

    let duplicate = server.post("/contributions").json(&request).await;
    duplicate.assert_status(StatusCode::CONFLICT);

    let badge: Value = server.get(&format!("/users/{ALICE}/badge")).await.json();
    assert_eq!(badge["tier"], "pup_supporter");

    let token = admin_token(&server).await;
    server
        .post(&format!("/admin/contributions/{id}/approve"))
        .add_header(AUTHORIZATION, token)
        .await
        .assert_status_ok();

    let badge: Value = server.get(&format!("/users/{ALICE}/badge")).await.json();
    assert_eq!(badge["tier"], "alpha_bork");

    let summary: Value = server.get("/fundraiser").await.json();
    assert_eq!(summary["total_raised"], 250.0);
    assert_eq!(summary["contributors"], 1);
}

#[tokio::test]
async fn test_contribution_below_minimum() {
    let server = create_test_server().await;
    let response = server
        .post("/contributions")
        .json(&json!({
            "address": ALICE,
            "amount": 1.0,
            "currency": "USDT",
            "tx_hash": "0xdeadbeefcafe0001"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_badge_catalogue_and_classify() {
    let server = create_test_server().await;
    let tiers: Value = server.get("/badges").await.json();
    assert_eq!(tiers.as_array().unwrap().len(), 6);

    let response = server.get("/badges/classify?amount=1000").await;
    response.assert_status_ok();
    let badge: Value = response.json();
    assert_eq!(badge["tier"], "mega_bork");
}

// ============ Airdrop ============

#[tokio::test]
async fn test_airdrop_requires_payment() {
    let server = create_test_server().await;
    let claim = json!({ "address": ALICE, "email": "pup@bork.dog" });

    server
        .put("/airdrop/claim")
        .json(&claim)
        .await
        .assert_status(StatusCode::CONFLICT);

    server
        .post("/airdrop/payment")
        .json(&json!({ "address": ALICE, "tx_hash": "0x0123456789abcdef" }))
        .await
        .assert_status_ok();

    let response = server.put("/airdrop/claim").json(&claim).await;
    response.assert_status_ok();

    let stored: Value = server.get(&format!("/airdrop/{ALICE}")).await.json();
    assert_eq!(stored["paid"], true);
    assert_eq!(stored["email"], "pup@bork.dog");
}

// ============ Admin ============

#[tokio::test]
async fn test_admin_routes_require_token() {
    let server = create_test_server().await;
    server
        .get("/admin/stats")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    server
        .post("/admin/login")
        .json(&json!({ "username": "admin", "password": "nope" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    let token = admin_token(&server).await;
    let response = server.get("/admin/stats").add_header(AUTHORIZATION, token).await;
    response.assert_status_ok();
    let stats: Value = response.json();
    assert_eq!(stats["tasks"], 5);
}

#[tokio::test]
async fn test_admin_task_management() {
    let server = create_test_server().await;
    let token = admin_token(&server).await;

    let task = json!({
        "title": "Share the whitepaper",
        "description": "Post the whitepaper link on Twitter",
        "reward": 60,
        "difficulty": "easy",
        "task_type": "one-time",
        "destination_url": "https://borkchain.io/whitepaper"
    });
    let response = server
        .post("/admin/tasks")
        .add_header(AUTHORIZATION, token.clone())
        .json(&task)
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["id"], "6");

    let mut invalid = task.clone();
    invalid["reward"] = json!(0);
    server
        .put("/admin/tasks/6")
        .add_header(AUTHORIZATION, token.clone())
        .json(&invalid)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .delete("/admin/tasks/6")
        .add_header(AUTHORIZATION, token.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let tasks: Value = server.get("/tasks").await.json();
    assert_eq!(tasks.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_admin_user_correction() {
    let server = create_test_server().await;
    connect(&server, ALICE, None).await;
    let token = admin_token(&server).await;

    let response = server
        .put(&format!("/admin/users/{ALICE}"))
        .add_header(AUTHORIZATION, token.clone())
        .json(&json!({ "balance": 999 }))
        .await;
    response.assert_status_ok();
    let user: Value = response.json();
    assert_eq!(user["balance"], 999);

    let board: Value = server.get("/leaderboard?limit=1").await.json();
    assert_eq!(board.as_array().unwrap().len(), 1);
    assert_eq!(board[0]["address"], ALICE);

    server
        .delete(&format!("/admin/users/{ALICE}"))
        .add_header(AUTHORIZATION, token)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/users/{ALICE}"))
        .await
        .assert_status_not_found();
}
