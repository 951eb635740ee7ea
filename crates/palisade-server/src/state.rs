//! Shared application state.
//!
//! One [`AppState`] value is cloned into every middleware and handler. All
//! pipeline components are explicit instances built here; nothing lives in
//! process-global statics, so tests construct as many independent stacks as
//! they need.

use crate::config::AppConfig;
use crate::limiter::RateLimiter;
use palisade_auth::{AuthFlow, DynUserStore, LockoutGuard, TokenService};
use palisade_cache::CacheStore;
use palisade_db_memory::{create_audit_store, create_user_store};
use palisade_storage::DynAuditStore;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub audit_store: DynAuditStore,
    pub users: DynUserStore,
    pub cache: CacheStore,
    pub auth: AuthFlow,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Build the full pipeline state from configuration: connect (or
    /// degrade) the cache, create the stores and wire the auth flow.
    ///
    /// # Errors
    ///
    /// Returns a message when the configuration fails validation.
    pub async fn from_config(config: AppConfig) -> Result<Self, String> {
        config.validate()?;

        let cache = CacheStore::connect(&config.cache).await;
        // storage.backend is validated above; "memory" is the only backend
        let audit_store = create_audit_store();
        let users = create_user_store();

        let lockout = LockoutGuard::new(cache.clone(), config.lockout.clone());
        let tokens = TokenService::new(&config.auth.secret, config.auth.token_ttl_seconds);
        let auth = AuthFlow::new(users.clone(), lockout, tokens);
        let limiter = Arc::new(RateLimiter::new(
            config.rate_limit.quota,
            Duration::from_millis(config.rate_limit.window_ms),
        ));

        if config.auth.uses_default_secret() {
            tracing::warn!(
                "auth.secret is the development default; set a deployment-specific secret"
            );
        }

        Ok(Self {
            config: Arc::new(config),
            audit_store,
            users,
            cache,
            auth,
            limiter,
        })
    }
}
