//! Request audit pipeline.
//!
//! The outermost middleware. Every request whose path is not on the skip
//! list produces exactly one durable [`palisade_core::AuditRecord`] plus a
//! mirrored structured log entry, stamped with the classified action, the
//! resolved client identity, the response status and the elapsed time.
//!
//! Two guarantees shape the implementation:
//!
//! * Audit failures never touch the response. A failed append is logged at
//!   error severity and the handler's response goes out unchanged.
//! * A request dropped mid-flight (client disconnect) is still finalized.
//!   The in-flight state lives in a guard whose `Drop` arm writes a
//!   best-effort record from a detached task when no response was produced.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use palisade_auth::Actor;
use palisade_core::{AuditAction, AuditDraft, classify};
use serde_json::json;
use std::time::Instant;

use crate::audit_log;
use crate::client_info::{self, ClientInfo};
use crate::middleware::path_matches;
use crate::state::AppState;

/// Status recorded when the connection went away before a response existed.
const CLIENT_CLOSED_REQUEST: u16 = 499;

pub async fn audit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let audit = &state.config.audit;
    if !audit.enabled || path_matches(&audit.skip_paths, req.uri().path()) {
        return next.run(req).await;
    }

    let pending = PendingAudit::begin(state.clone(), &req);
    let mut response = next.run(req).await;
    pending.finish(&mut response).await;
    response
}

/// In-flight audit state, armed until the request is finalized.
struct PendingAudit {
    inner: Option<PendingInner>,
}

struct PendingInner {
    state: AppState,
    action: AuditAction,
    method: String,
    path: String,
    client: ClientInfo,
    started: Instant,
}

impl PendingAudit {
    fn begin(state: AppState, req: &Request<Body>) -> Self {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        Self {
            inner: Some(PendingInner {
                action: classify(&method, &path),
                client: client_info::from_request(req),
                state,
                method,
                path,
                started: Instant::now(),
            }),
        }
    }

    /// Finalize with the real response: status from the wire, actor from the
    /// response extensions where the authentication gate mirrored it.
    ///
    /// Takes `&mut` only so the held borrow stays `Send` across the await:
    /// the response body is `!Sync`, which poisons a shared reference.
    async fn finish(mut self, response: &mut Response) {
        let Some(inner) = self.inner.take() else {
            return;
        };
        let status = response.status().as_u16();
        let actor = response.extensions().get::<Actor>().cloned();
        inner.record(status, actor).await;
    }
}

impl Drop for PendingAudit {
    fn drop(&mut self) {
        let Some(inner) = self.inner.take() else {
            return;
        };
        // The future was dropped before a response existed; finalize from a
        // detached task since Drop cannot await.
        tokio::spawn(async move {
            inner.record(CLIENT_CLOSED_REQUEST, None).await;
        });
    }
}

impl PendingInner {
    async fn record(self, status: u16, actor: Option<Actor>) {
        let duration_ms = self.started.elapsed().as_secs_f64() * 1000.0;

        let mut draft = AuditDraft::new(self.action)
            .request(self.method.clone(), self.path.clone())
            .status(status)
            .client(self.client.ip.clone(), self.client.user_agent.clone())
            .detail(json!({ "duration_ms": (duration_ms * 100.0).round() / 100.0 }));
        if let Some(actor) = &actor {
            draft = draft.actor(actor.id, actor.email.clone());
        }
        if status == CLIENT_CLOSED_REQUEST {
            draft = draft.error("client closed request before completion");
        }

        match self.state.audit_store.append(draft).await {
            Ok(record) => audit_log::request_completed(&record, duration_ms),
            Err(err) => tracing::error!(
                error = %err,
                method = %self.method,
                path = %self.path,
                "Failed to persist audit record"
            ),
        }
    }
}
