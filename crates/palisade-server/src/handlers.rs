//! HTTP handlers: the authentication surface, the admin read paths and the
//! infrastructure endpoints.
//!
//! Handlers stay thin. Credential work lives in [`palisade_auth::AuthFlow`],
//! audit queries in the audit store, and everything here just translates
//! between HTTP and those components. Admin handlers check the actor's role
//! themselves via [`require_admin`]; authentication already happened in the
//! gate, which put the [`Actor`] into the request extensions.

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use palisade_auth::{Actor, AuthError, AuthUser, LockoutStatus, Role, policy};
use palisade_core::{AuditAction, EventTime};
use palisade_storage::{AuditQuery, StorageError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::state::AppState;

// ---- Infrastructure ----

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "message": "Palisade API - Ready",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = json!({
        "status": "healthy",
        "cache": {
            "mode": state.cache.mode(),
            "degraded": state.cache.is_degraded(),
        },
    });
    (StatusCode::OK, Json(body))
}

pub async fn version() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "version": env!("CARGO_PKG_VERSION") })),
    )
}

// ---- Authentication ----

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Response {
    portal_login(state, jar, body, None).await
}

pub async fn login_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Response {
    portal_login(state, jar, body, Some(Role::Admin)).await
}

pub async fn login_manager(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Response {
    portal_login(state, jar, body, Some(Role::Manager)).await
}

pub async fn login_member(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Response {
    portal_login(state, jar, body, Some(Role::Member)).await
}

/// Shared login path. The portal role check runs after the credential flow,
/// so failed attempts still feed the lockout counter and a success still
/// clears it; a wrong-portal login is then rejected before any cookie is
/// issued.
async fn portal_login(
    state: AppState,
    jar: CookieJar,
    body: LoginRequest,
    portal: Option<Role>,
) -> Response {
    let outcome = match state.auth.login(&body.email, &body.password).await {
        Ok(outcome) => outcome,
        Err(err) => return err.into_response(),
    };

    if let Some(required) = portal
        && outcome.user.role != required
    {
        return AuthError::forbidden(format!(
            "Access denied. This portal is for {required} only."
        ))
        .into_response();
    }

    let jar = jar.add(session_cookie(&state, &outcome.token, outcome.expires_in));
    let body = json!({
        "access_token": outcome.token,
        "token_type": "bearer",
        "expires_in": outcome.expires_in,
        "user": public_user(&outcome.user),
    });
    (jar, Json(body)).into_response()
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    let mut removal = Cookie::from(state.config.auth.cookie_name.clone());
    removal.set_path("/");
    let jar = jar.remove(removal);
    (jar, Json(json!({ "message": "Logged out successfully" }))).into_response()
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// Register a new member account. Also mounted at `/auth/create` for older
/// clients.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Response {
    match state
        .auth
        .register(&body.email, &body.name, &body.password)
        .await
    {
        Ok(user) => Json(public_user(&user)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn check_email(State(state): State<AppState>, Path(email): Path<String>) -> Response {
    match state.auth.email_available(&email).await {
        Ok(available) => Json(json!({ "exists": !available })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn roles() -> impl IntoResponse {
    let roles: Vec<Value> = Role::ALL
        .iter()
        .map(|role| {
            json!({
                "name": role.as_str(),
                "display_name": role.display_name(),
            })
        })
        .collect();
    (StatusCode::OK, Json(roles))
}

#[derive(Debug, Deserialize)]
pub struct PasswordQuery {
    pub password: String,
}

/// Password pre-check for registration forms.
pub async fn validate_password(Query(query): Query<PasswordQuery>) -> impl IntoResponse {
    let errors = match policy::validate(&query.password) {
        Ok(()) => Vec::new(),
        Err(errors) => errors,
    };
    let body = json!({
        "is_valid": errors.is_empty(),
        "errors": errors,
        "strength": policy::strength(&query.password),
    });
    (StatusCode::OK, Json(body))
}

fn session_cookie(state: &AppState, token: &str, expires_in: u64) -> Cookie<'static> {
    let auth = &state.config.auth;
    Cookie::build((auth.cookie_name.clone(), token.to_string()))
        .path("/")
        .http_only(true)
        .secure(auth.cookie_secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(expires_in as i64))
        .build()
}

/// The API view of an account, without the credential material.
fn public_user(user: &AuthUser) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "name": user.name,
        "role": user.role,
    })
}

// ---- Admin ----

fn require_admin(actor: &Actor) -> Result<(), AuthError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AuthError::forbidden("Administrator access required"))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogParams {
    pub user_id: Option<i64>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<i64>,
    #[serde(default)]
    pub failed_only: bool,
    /// Inclusive creation-time bounds, RFC 3339.
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub offset: usize,
    pub limit: Option<usize>,
}

fn parse_time_bound(raw: Option<&str>, field: &str) -> Result<Option<EventTime>, Response> {
    let Some(raw) = raw else { return Ok(None) };
    raw.parse::<EventTime>().map(Some).map_err(|_| {
        let detail = format!("Invalid {field} '{raw}': expected an RFC 3339 timestamp");
        (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
    })
}

pub async fn list_audit_logs(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<AuditLogParams>,
) -> Response {
    if let Err(err) = require_admin(&actor) {
        return err.into_response();
    }

    let action = match params.action.as_deref().map(str::parse::<AuditAction>) {
        None => None,
        Some(Ok(action)) => Some(action),
        Some(Err(_)) => {
            let detail = format!("Unknown action '{}'", params.action.unwrap_or_default());
            return (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response();
        }
    };

    let start = match parse_time_bound(params.start_date.as_deref(), "start_date") {
        Ok(bound) => bound,
        Err(response) => return response,
    };
    let end = match parse_time_bound(params.end_date.as_deref(), "end_date") {
        Ok(bound) => bound,
        Err(response) => return response,
    };

    let mut query = AuditQuery::new().page(params.offset, params.limit.unwrap_or(100).min(1000));
    query.user_id = params.user_id;
    query.action = action;
    query.resource_type = params.resource_type;
    query.resource_id = params.resource_id;
    query.failed_only = params.failed_only;
    query.start = start;
    query.end = end;

    match state.audit_store.list(&query).await {
        Ok(records) => Json(records).into_response(),
        Err(err) => storage_error(err),
    }
}

fn default_stats_days() -> u32 {
    30
}

#[derive(Debug, Deserialize)]
pub struct StatsParams {
    #[serde(default = "default_stats_days")]
    pub days: u32,
}

pub async fn audit_stats(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(params): Query<StatsParams>,
) -> Response {
    if let Err(err) = require_admin(&actor) {
        return err.into_response();
    }
    match state.audit_store.statistics(params.days).await {
        Ok(stats) => Json(stats).into_response(),
        Err(err) => storage_error(err),
    }
}

pub async fn audit_log_by_id(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<i64>,
) -> Response {
    if let Err(err) = require_admin(&actor) {
        return err.into_response();
    }
    match state.audit_store.find_by_id(id).await {
        Ok(Some(record)) => Json(record).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "Audit log not found" })),
        )
            .into_response(),
        Err(err) => storage_error(err),
    }
}

#[derive(Serialize)]
struct LockoutView {
    email: String,
    #[serde(flatten)]
    status: LockoutStatus,
}

pub async fn lockout_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(email): Path<String>,
) -> Response {
    if let Err(err) = require_admin(&actor) {
        return err.into_response();
    }
    let email = email.trim().to_lowercase();
    let status = state.auth.lockout().status(&email).await;
    Json(LockoutView { email, status }).into_response()
}

pub async fn clear_cache(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Response {
    if let Err(err) = require_admin(&actor) {
        return err.into_response();
    }
    let flushed = state.cache.flush_all().await;
    tracing::info!(actor = %actor.email, flushed, "Cache flush requested");
    Json(json!({ "message": "Cache cleared successfully", "flushed": flushed })).into_response()
}

fn storage_error(err: StorageError) -> Response {
    tracing::error!(error = %err, "Audit store query failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": "Internal server error" })),
    )
        .into_response()
}
