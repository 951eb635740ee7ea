//! # palisade-server
//!
//! The Palisade HTTP server: request classification, rate limiting, account
//! lockout, caching and the audit pipeline assembled into one axum service.
//!
//! The server is built from explicit instances held in [`AppState`]; nothing
//! lives in process globals, so integration tests spin up as many isolated
//! stacks as they need:
//!
//! ```ignore
//! let state = AppState::from_config(AppConfig::default()).await?;
//! let app = build_app(state);
//! ```

pub mod audit;
pub mod audit_log;
pub mod bootstrap;
pub mod client_info;
pub mod config;
pub mod handlers;
pub mod limiter;
pub mod middleware;
pub mod observability;
pub mod server;
pub mod state;

pub use config::AppConfig;
pub use limiter::{Decision, RateLimiter};
pub use observability::{apply_logging_level, init_tracing};
pub use server::{PalisadeServer, ServerBuilder, build_app};
pub use state::AppState;
