//! Integration tests for the authentication surface and the admin read
//! paths: login cookies, bearer tokens, lockout, registration, rate limits
//! and the audit/lockout admin views.
//!
//! Run with: cargo test -p palisade-server --test auth_endpoints

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use palisade_auth::{AuthFlow, LockoutGuard, TokenService};
use palisade_cache::CacheStore;
use palisade_db_memory::{create_audit_store, create_user_store};
use palisade_server::config::BootstrapConfig;
use palisade_server::{AppConfig, AppState, RateLimiter, bootstrap, build_app};
use serde_json::{Value, json};
use tokio::task::JoinHandle;

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    // Generous quota so only the tests that want a 429 ever see one
    config.rate_limit.quota = 1000;
    config
}

fn test_state(config: AppConfig) -> AppState {
    let cache = CacheStore::in_memory();
    let users = create_user_store();
    let lockout = LockoutGuard::new(cache.clone(), config.lockout.clone());
    let tokens = TokenService::new(&config.auth.secret, config.auth.token_ttl_seconds);
    let auth = AuthFlow::new(users.clone(), lockout, tokens);
    let limiter = Arc::new(RateLimiter::new(
        config.rate_limit.quota,
        Duration::from_millis(config.rate_limit.window_ms),
    ));
    AppState {
        config: Arc::new(config),
        audit_store: create_audit_store(),
        users,
        cache,
        auth,
        limiter,
    }
}

async fn seed_admin(state: &AppState) {
    let seed = BootstrapConfig {
        admin_email: Some("root@example.com".to_string()),
        admin_password: Some("R00t!Secret".to_string()),
        admin_name: "Root".to_string(),
    };
    bootstrap::ensure_admin(&state.users, &seed).await;
}

async fn start_server(
    state: AppState,
) -> (String, tokio::sync::oneshot::Sender<()>, JoinHandle<()>) {
    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let server = tokio::spawn(async move {
        let _ = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            let _ = rx.await;
        })
        .await;
    });

    (format!("http://{addr}"), tx, server)
}

async fn register_member(client: &reqwest::Client, base: &str, email: &str) {
    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({ "email": email, "name": "Member", "password": "Str0ng!Pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn login_sets_cookie_and_returns_token() {
    let state = test_state(test_config());
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();
    register_member(&client, &base, "kim@example.com").await;

    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({ "email": "kim@example.com", "password": "Str0ng!Pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let set_cookie = resp
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("access_token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    assert!(set_cookie.contains("Path=/"));

    let body: Value = resp.json().await.unwrap();
    assert!(body["access_token"].is_string());
    assert_eq!(body["token_type"], "bearer");
    assert_eq!(body["expires_in"], 86_400);
    assert_eq!(body["user"]["email"], "kim@example.com");
    assert_eq!(body["user"]["role"], "member");
    assert!(body["user"].get("password_hash").is_none());

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn cookie_wins_over_bad_bearer() {
    let state = test_state(test_config());
    seed_admin(&state).await;
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();

    let resp = client
        .post(format!("{base}/auth/login/admin"))
        .json(&json!({ "email": "root@example.com", "password": "R00t!Secret" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    // The bogus bearer would be a 401 on its own; the cookie takes
    // precedence and authenticates the request
    let resp = client
        .get(format!("{base}/api/audit-logs"))
        .header("authorization", "Bearer not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert!(body.is_array());

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn bearer_token_authenticates_without_cookie() {
    let state = test_state(test_config());
    seed_admin(&state).await;
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({ "email": "root@example.com", "password": "R00t!Secret" }))
        .send()
        .await
        .unwrap();
    let login: Value = resp.json().await.unwrap();
    let token = login["access_token"].as_str().unwrap().to_string();

    let resp = client
        .get(format!("{base}/api/audit-logs"))
        .header("authorization", format!("Bearer {token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    let state = test_state(test_config());
    seed_admin(&state).await;
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap();

    client
        .post(format!("{base}/auth/login/admin"))
        .json(&json!({ "email": "root@example.com", "password": "R00t!Secret" }))
        .send()
        .await
        .unwrap();
    let resp = client
        .get(format!("{base}/api/audit-logs"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let resp = client
        .post(format!("{base}/auth/logout"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Logged out successfully");

    let resp = client
        .get(format!("{base}/api/audit-logs"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn lockout_after_five_failures_end_to_end() {
    let state = test_state(test_config());
    seed_admin(&state).await;
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();
    register_member(&client, &base, "kim@example.com").await;

    for remaining in (1..=4).rev() {
        let resp = client
            .post(format!("{base}/auth/login"))
            .json(&json!({ "email": "kim@example.com", "password": "wrong" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
        let body: Value = resp.json().await.unwrap();
        let detail = body["detail"].as_str().unwrap();
        assert!(
            detail.contains(&format!("{remaining} attempt")),
            "unexpected detail: {detail}"
        );
    }

    // The fifth failure locks the account
    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({ "email": "kim@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().get(reqwest::header::RETRY_AFTER).is_some());
    let body: Value = resp.json().await.unwrap();
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .contains("Too many failed login attempts")
    );

    // Even the correct password is refused while locked
    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({ "email": "kim@example.com", "password": "Str0ng!Pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);

    // The admin view reflects the lock
    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({ "email": "root@example.com", "password": "R00t!Secret" }))
        .send()
        .await
        .unwrap();
    let login: Value = resp.json().await.unwrap();
    let token = login["access_token"].as_str().unwrap().to_string();

    let resp = client
        .get(format!("{base}/api/lockout/kim@example.com"))
        .header("authorization", format!("Bearer {token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let status: Value = resp.json().await.unwrap();
    assert_eq!(status["email"], "kim@example.com");
    assert_eq!(status["is_locked"], true);
    assert_eq!(status["failed_attempts"], 5);
    assert_eq!(status["remaining_attempts"], 0);
    assert!(status["remaining_seconds"].as_u64().unwrap() <= 900);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn lockout_view_requires_admin() {
    let state = test_state(test_config());
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();
    register_member(&client, &base, "kim@example.com").await;

    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({ "email": "kim@example.com", "password": "Str0ng!Pass" }))
        .send()
        .await
        .unwrap();
    let login: Value = resp.json().await.unwrap();
    let token = login["access_token"].as_str().unwrap().to_string();

    let resp = client
        .get(format!("{base}/api/lockout/other@example.com"))
        .header("authorization", format!("Bearer {token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Administrator access required");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn register_validates_input() {
    let state = test_state(test_config());
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({ "email": "kim@example.com", "name": "Kim", "password": "Str0ng!Pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["email"], "kim@example.com");
    assert_eq!(body["role"], "member");
    assert!(body.get("password_hash").is_none());

    // Duplicate email
    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({ "email": "kim@example.com", "name": "Kim", "password": "Str0ng!Pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Email already registered");

    // Policy violation
    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({ "email": "weak@example.com", "name": "W", "password": "short" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .contains("Password does not meet security requirements")
    );

    // Malformed email
    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({ "email": "not-an-email", "name": "X", "password": "Str0ng!Pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    // The old /auth/create alias still registers
    let resp = client
        .post(format!("{base}/auth/create"))
        .json(&json!({ "email": "legacy@example.com", "name": "L", "password": "Str0ng!Pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn check_email_reports_existence() {
    let state = test_state(test_config());
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();
    register_member(&client, &base, "kim@example.com").await;

    let resp = client
        .get(format!("{base}/auth/check-email/kim@example.com"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["exists"], true);

    let resp = client
        .get(format!("{base}/auth/check-email/nobody@example.com"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["exists"], false);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn roles_and_validate_password_are_public() {
    let state = test_state(test_config());
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/auth/roles")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body.as_array().unwrap().len(), 3);
    assert_eq!(body[0]["name"], "admin");
    assert_eq!(body[0]["display_name"], "Administrator");

    let resp = client
        .post(format!("{base}/auth/validate-password?password=weak"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["is_valid"], false);
    assert!(!body["errors"].as_array().unwrap().is_empty());
    assert_eq!(body["strength"]["level"], "weak");

    let resp = client
        .post(format!(
            "{base}/auth/validate-password?password=Str0ng!Passphrase"
        ))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["is_valid"], true);
    assert_eq!(body["strength"]["score"], 100);
    assert_eq!(body["strength"]["level"], "very_strong");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn wrong_portal_login_is_rejected_without_burning_attempts() {
    let state = test_state(test_config());
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();
    register_member(&client, &base, "kim@example.com").await;

    let resp = client
        .post(format!("{base}/auth/login/admin"))
        .json(&json!({ "email": "kim@example.com", "password": "Str0ng!Pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Access denied. This portal is for admin only.");

    // The credentials were valid, so the failure counter stayed clear and
    // the right portal still works
    let resp = client
        .post(format!("{base}/auth/login/member"))
        .json(&json!({ "email": "kim@example.com", "password": "Str0ng!Pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn rate_limit_returns_429_with_retry_hint() {
    let mut config = test_config();
    config.rate_limit.quota = 3;
    config.rate_limit.window_ms = 60_000;
    let state = test_state(config);
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();

    for _ in 0..3 {
        let resp = client.get(format!("{base}/version")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
    }

    let resp = client.get(format!("{base}/version")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = resp
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .unwrap()
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    assert!(retry_after >= 1);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Too many requests. Please slow down.");
    assert!(body["retry_after"].as_u64().unwrap() >= 1);

    // Exempt paths are never limited
    for _ in 0..10 {
        let resp = client.get(format!("{base}/health")).send().await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
    }

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn health_reports_cache_mode() {
    let state = test_state(test_config());
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cache"]["mode"], "memory");
    assert_eq!(body["cache"]["degraded"], false);

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}

#[tokio::test]
async fn admin_audit_views() {
    let state = test_state(test_config());
    seed_admin(&state).await;
    let (base, shutdown_tx, handle) = start_server(state).await;
    let client = reqwest::Client::new();

    // Some traffic to look at
    for _ in 0..3 {
        client.get(format!("{base}/version")).send().await.unwrap();
    }

    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({ "email": "root@example.com", "password": "R00t!Secret" }))
        .send()
        .await
        .unwrap();
    let login: Value = resp.json().await.unwrap();
    let token = login["access_token"].as_str().unwrap().to_string();
    let auth_header = format!("Bearer {token}");

    let resp = client
        .get(format!("{base}/api/audit-logs"))
        .header("authorization", &auth_header)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let logs: Value = resp.json().await.unwrap();
    let logs = logs.as_array().unwrap();
    assert!(logs.len() >= 4);
    let first_id = logs[0]["id"].as_i64().unwrap();

    // Filtered by action
    let resp = client
        .get(format!("{base}/api/audit-logs?action=SYSTEM_ACCESS"))
        .header("authorization", &auth_header)
        .send()
        .await
        .unwrap();
    let filtered: Value = resp.json().await.unwrap();
    let filtered = filtered.as_array().unwrap();
    assert_eq!(filtered.len(), 3);
    assert!(filtered.iter().all(|log| log["action"] == "SYSTEM_ACCESS"));

    // Unknown action tag is a client error
    let resp = client
        .get(format!("{base}/api/audit-logs?action=BOGUS"))
        .header("authorization", &auth_header)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Unknown action 'BOGUS'");

    // A window that opens in the far future matches nothing
    let resp = client
        .get(format!(
            "{base}/api/audit-logs?start_date=2099-01-01T00:00:00%2B07:00"
        ))
        .header("authorization", &auth_header)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let future: Value = resp.json().await.unwrap();
    assert!(future.as_array().unwrap().is_empty());

    // Malformed bounds are a client error
    let resp = client
        .get(format!("{base}/api/audit-logs?end_date=yesterday"))
        .header("authorization", &auth_header)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["detail"],
        "Invalid end_date 'yesterday': expected an RFC 3339 timestamp"
    );

    // Aggregate statistics
    let resp = client
        .get(format!("{base}/api/audit-logs/stats?days=7"))
        .header("authorization", &auth_header)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let stats: Value = resp.json().await.unwrap();
    assert_eq!(stats["period_days"], 7);
    assert!(stats["total_actions"].as_u64().unwrap() >= 4);
    assert!(stats["success_rate"].as_f64().is_some());

    // Single record fetch
    let resp = client
        .get(format!("{base}/api/audit-logs/{first_id}"))
        .header("authorization", &auth_header)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let record: Value = resp.json().await.unwrap();
    assert_eq!(record["id"].as_i64().unwrap(), first_id);

    let resp = client
        .get(format!("{base}/api/audit-logs/999999"))
        .header("authorization", &auth_header)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["detail"], "Audit log not found");

    let _ = shutdown_tx.send(());
    let _ = handle.await;
}
