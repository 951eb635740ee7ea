//! Account lockout guard.
//!
//! Tracks failed login attempts per email and locks the account after too
//! many. State lives in the cache store, so in a multi-instance deployment
//! with a networked cache the lockout is shared; the attempt counter rides
//! on the cache TTL, which is refreshed by every failure.
//!
//! Callers drive the flow in a fixed order: consult [`LockoutGuard::check_locked`]
//! before verifying credentials, then call [`LockoutGuard::record_failure`]
//! or [`LockoutGuard::reset`] depending on the outcome.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;

use palisade_cache::CacheStore;
use palisade_core::EventTime;

fn default_max_failed_attempts() -> u32 {
    5
}

fn default_lockout_seconds() -> u64 {
    // 15 minutes
    900
}

fn default_reset_window_seconds() -> u64 {
    // 30 minutes
    1800
}

/// Lockout policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockoutConfig {
    /// Failures allowed before the account locks.
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,

    /// How long a lockout lasts once triggered.
    #[serde(default = "default_lockout_seconds")]
    pub lockout_seconds: u64,

    /// Idle window after which the failure counter is forgotten. Refreshed
    /// by every failure, and independent of `lockout_seconds`.
    #[serde(default = "default_reset_window_seconds")]
    pub reset_window_seconds: u64,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed_attempts(),
            lockout_seconds: default_lockout_seconds(),
            reset_window_seconds: default_reset_window_seconds(),
        }
    }
}

impl LockoutConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_failed_attempts == 0 {
            return Err("lockout.max_failed_attempts must be at least 1".to_string());
        }
        if self.lockout_seconds == 0 {
            return Err("lockout.lockout_seconds must be greater than 0".to_string());
        }
        if self.reset_window_seconds == 0 {
            return Err("lockout.reset_window_seconds must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Per-email failure state, stored as JSON in the cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LockoutRecord {
    failed_attempts: u32,
    last_attempt: i64,
    locked_until: Option<i64>,
}

/// Lockout state for the read-only admin view.
#[derive(Debug, Clone, Serialize)]
pub struct LockoutStatus {
    /// Whether the account is currently locked.
    pub is_locked: bool,
    /// Failures recorded in the current window.
    pub failed_attempts: u32,
    /// Failures left before a lockout triggers.
    pub remaining_attempts: u32,
    /// When the lockout expires, if one is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_until: Option<EventTime>,
    /// Seconds until the lockout expires, if one is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
}

/// Guards login against brute-force attempts.
#[derive(Clone)]
pub struct LockoutGuard {
    cache: CacheStore,
    config: LockoutConfig,
}

impl LockoutGuard {
    /// Create a guard over a cache store.
    #[must_use]
    pub fn new(cache: CacheStore, config: LockoutConfig) -> Self {
        Self { cache, config }
    }

    /// The configured attempt limit.
    #[must_use]
    pub fn max_failed_attempts(&self) -> u32 {
        self.config.max_failed_attempts
    }

    fn key(email: &str) -> String {
        format!("lockout:{}", email.trim().to_lowercase())
    }

    fn window(&self) -> Duration {
        Duration::from_secs(self.config.reset_window_seconds)
    }

    /// Whether the account is locked, and for how many more seconds.
    ///
    /// A lockout that has already expired is purged here, counter included,
    /// so the next failure starts a fresh window.
    pub async fn check_locked(&self, email: &str) -> (bool, Option<u64>) {
        let key = Self::key(email);
        let Some(record) = self.cache.get::<LockoutRecord>(&key).await else {
            return (false, None);
        };

        if let Some(locked_until) = record.locked_until {
            let now = OffsetDateTime::now_utc().unix_timestamp();
            if now < locked_until {
                return (true, Some((locked_until - now) as u64));
            }
            // Lockout served; forget the account entirely
            self.cache.delete(&key).await;
        }
        (false, None)
    }

    /// Record a failed attempt. Returns the attempt count and whether the
    /// account is now locked.
    ///
    /// Every failure re-arms the reset window, so only a full quiet period
    /// of `reset_window_seconds` clears the counter.
    pub async fn record_failure(&self, email: &str) -> (u32, bool) {
        let key = Self::key(email);
        let mut record = self
            .cache
            .get::<LockoutRecord>(&key)
            .await
            .unwrap_or_default();

        let now = OffsetDateTime::now_utc().unix_timestamp();
        record.failed_attempts += 1;
        record.last_attempt = now;

        let locked = record.failed_attempts >= self.config.max_failed_attempts;
        if locked {
            record.locked_until = Some(now + self.config.lockout_seconds as i64);
            tracing::warn!(
                email = %email.to_lowercase(),
                attempts = record.failed_attempts,
                lockout_seconds = self.config.lockout_seconds,
                "Account locked after repeated failed logins"
            );
        }

        self.cache.set(&key, &record, self.window()).await;
        (record.failed_attempts, locked)
    }

    /// Clear all failure state for an account (successful login).
    pub async fn reset(&self, email: &str) {
        self.cache.delete(&Self::key(email)).await;
        tracing::debug!(email = %email.to_lowercase(), "Lockout state reset");
    }

    /// Read-only lockout state for an account. Never mutates, so an expired
    /// lockout still shows its residual attempt count until someone calls
    /// [`Self::check_locked`].
    pub async fn status(&self, email: &str) -> LockoutStatus {
        let record = self
            .cache
            .get::<LockoutRecord>(&Self::key(email))
            .await
            .unwrap_or_default();

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let active = record
            .locked_until
            .filter(|locked_until| now < *locked_until);

        LockoutStatus {
            is_locked: active.is_some(),
            failed_attempts: record.failed_attempts,
            remaining_attempts: self
                .config
                .max_failed_attempts
                .saturating_sub(record.failed_attempts),
            locked_until: active
                .and_then(|ts| OffsetDateTime::from_unix_timestamp(ts).ok())
                .map(EventTime::new),
            remaining_seconds: active.map(|locked_until| (locked_until - now) as u64),
        }
    }
}
