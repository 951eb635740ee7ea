//! Router assembly and the server run loop.
//!
//! [`build_app`] wires the routes and the middleware stack around one
//! [`AppState`]. Stack order, outermost first: audit pipeline, request id,
//! trace, CORS, rate limit, authentication gate, so every request is
//! audited (including the ones the limiter or the gate reject), and the
//! audit layer can read the actor the gate mirrored onto the response.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, CorsConfig};
use crate::state::AppState;
use crate::{audit, handlers, middleware as app_middleware};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        // Infrastructure
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Authentication
        .route("/auth/login", post(handlers::login))
        .route("/auth/login/admin", post(handlers::login_admin))
        .route("/auth/login/manager", post(handlers::login_manager))
        .route("/auth/login/member", post(handlers::login_member))
        .route("/auth/logout", post(handlers::logout))
        .route("/auth/register", post(handlers::register))
        .route("/auth/create", post(handlers::register))
        .route("/auth/check-email/{email}", get(handlers::check_email))
        .route("/auth/roles", get(handlers::roles))
        .route("/auth/validate-password", post(handlers::validate_password))
        // Admin
        .route("/api/audit-logs", get(handlers::list_audit_logs))
        .route("/api/audit-logs/stats", get(handlers::audit_stats))
        .route("/api/audit-logs/{id}", get(handlers::audit_log_by_id))
        .route("/api/lockout/{email}", get(handlers::lockout_status))
        .route("/api/admin/clear-cache", post(handlers::clear_cache))
        // Middleware stack; the last layer added is the outermost
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::auth_gate,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            app_middleware::rate_limit,
        ))
        .layer(cors_layer(&state.config.cors))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    // Favicon fetches get a throwaway span to keep logs quiet
                    if req.uri().path() == "/favicon.ico" {
                        return tracing::span!(tracing::Level::TRACE, "noop");
                    }
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %method,
                        http.target = %uri,
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        // The noop favicon span is identified by its name
                        if let Some(meta) = span.metadata()
                            && meta.name() != "noop"
                        {
                            tracing::info!(
                                http.status = %res.status().as_u16(),
                                elapsed_ms = %latency.as_millis(),
                                "request handled"
                            );
                        }
                    },
                ),
        )
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            audit::audit_middleware,
        ))
        .with_state(state)
}

/// Wildcard origins select the permissive layer (no credentials, any
/// header); explicit origins get a credentialed layer, which is what the
/// cookie-carrying frontend needs.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    if config.is_permissive() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}

pub struct ServerBuilder {
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the pipeline state and the server.
    ///
    /// # Errors
    ///
    /// Returns a message when the configuration fails validation.
    pub async fn build(self) -> Result<PalisadeServer, String> {
        let host = self.config.server.host.clone();
        let port = self.config.server.port;
        let state = AppState::from_config(self.config).await?;
        Ok(PalisadeServer { host, port, state })
    }
}

pub struct PalisadeServer {
    host: String,
    port: u16,
    state: AppState,
}

impl PalisadeServer {
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Bind the listener, start the limiter sweep and serve until a shutdown
    /// signal arrives.
    pub async fn run(self) -> anyhow::Result<()> {
        let sweep_seconds = self.state.config.rate_limit.sweep_interval_seconds;
        if sweep_seconds > 0 {
            let limiter = Arc::clone(&self.state.limiter);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(Duration::from_secs(sweep_seconds));
                // The first tick completes immediately; skip it
                ticker.tick().await;
                loop {
                    ticker.tick().await;
                    limiter.sweep_idle();
                }
            });
        }

        let app = build_app(self.state);
        let listener = tokio::net::TcpListener::bind((self.host.as_str(), self.port)).await?;
        let local = listener.local_addr()?;
        tracing::info!("✓ Listening on {local}");
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
