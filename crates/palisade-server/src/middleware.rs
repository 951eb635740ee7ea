//! Request middleware: request ids, rate limiting and the authentication
//! gate.
//!
//! The audit pipeline lives in [`crate::audit`]; everything here runs inside
//! it. Stack order (outermost first): audit, request id, trace, CORS, rate
//! limit, authentication gate.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;
use palisade_auth::AuthError;
use serde_json::json;
use std::time::Duration;
use uuid::Uuid;

use crate::audit_log::{self, LogContext};
use crate::client_info;
use crate::limiter::Decision;
use crate::state::AppState;

/// Plain prefix match against a configured skip list.
pub(crate) fn path_matches(prefixes: &[String], path: &str) -> bool {
    prefixes.iter().any(|prefix| path.starts_with(prefix))
}

/// Preserve an incoming `x-request-id` or generate one, expose it to
/// downstream layers via extensions, and echo it on the response.
pub async fn request_id(mut req: Request<Body>, next: Next) -> Response {
    let header_name = HeaderName::from_static("x-request-id");

    let req_id_value = req
        .headers()
        .get(&header_name)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).unwrap());

    req.extensions_mut().insert(req_id_value.clone());

    let mut res = next.run(req).await;

    res.headers_mut().insert(header_name, req_id_value);

    res
}

/// Sliding-window rate limiting keyed by client identity.
pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let limits = &state.config.rate_limit;
    if !limits.enabled || path_matches(&limits.exempt_paths, req.uri().path()) {
        return next.run(req).await;
    }

    let info = client_info::from_request(&req);
    match state.limiter.admit(info.client_id()) {
        Decision::Allowed => next.run(req).await,
        Decision::Limited { retry_after } => {
            audit_log::warning(
                "Rate limit exceeded",
                &LogContext {
                    client_ip: info.ip.clone(),
                    ..LogContext::default()
                },
            );
            too_many_requests_response(retry_after)
        }
    }
}

fn too_many_requests_response(retry_after: Duration) -> Response {
    let retry_secs = (retry_after.as_secs_f64().ceil() as u64).max(1);
    let body = json!({
        "detail": "Too many requests. Please slow down.",
        "retry_after": retry_secs,
    });
    (
        StatusCode::TOO_MANY_REQUESTS,
        [(header::RETRY_AFTER, retry_secs.to_string())],
        axum::Json(body),
    )
        .into_response()
}

/// Authentication gate: resolve the credential to an [`palisade_auth::Actor`]
/// or reject before any protected handler runs.
///
/// The session cookie takes precedence over a bearer header when both are
/// present. On success the actor rides the request extensions for handlers,
/// and is mirrored onto the response extensions so the audit layer wrapped
/// around this gate can attribute the request after the fact.
pub async fn auth_gate(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if state.config.auth.is_public(req.uri().path()) {
        return next.run(req).await;
    }

    let Some(token) = extract_token(req.headers(), &state.config.auth.cookie_name) else {
        return AuthError::MissingCredentials.into_response();
    };

    match state.auth.authenticate(&token).await {
        Ok(actor) => {
            req.extensions_mut().insert(actor.clone());
            let mut response = next.run(req).await;
            response.extensions_mut().insert(actor);
            response
        }
        Err(err) => err.into_response(),
    }
}

/// Pull the access token from the session cookie, falling back to an
/// `Authorization: Bearer` header.
fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    cookie_token(headers, cookie_name).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    jar.get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
}
