//! Sliding-window rate limiter.
//!
//! Per-client admission over a trailing window: each client id owns a vector
//! of admission instants, and a request is admitted while fewer than `quota`
//! instants remain inside the window. Prune, check and append happen under
//! one lock so the admit decision is linearizable per client: two requests
//! racing for the last slot can never both win it.
//!
//! The limiter is deliberately independent of the HTTP layer; the middleware
//! in [`crate::middleware`] translates [`Decision::Limited`] into a 429.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Outcome of an admission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    /// Over quota; retry once the window has slid past the oldest admission.
    Limited { retry_after: Duration },
}

impl Decision {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Shared sliding-window limiter state.
pub struct RateLimiter {
    quota: usize,
    window: Duration,
    clients: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(quota: u32, window: Duration) -> Self {
        Self {
            quota: quota as usize,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Admit or reject one request for `client_id`.
    ///
    /// Prunes admissions older than the window, rejects when `quota` remain,
    /// otherwise appends the current instant, all under one lock.
    pub fn admit(&self, client_id: &str) -> Decision {
        let now = Instant::now();
        let mut clients = self.clients.lock();
        let stamps = clients.entry(client_id.to_string()).or_default();

        stamps.retain(|instant| now.duration_since(*instant) < self.window);

        if stamps.len() >= self.quota {
            // Push order keeps the vector sorted, so the head is the next
            // admission to leave the window.
            let retry_after = stamps.first().map_or(self.window, |oldest| {
                self.window
                    .saturating_sub(now.duration_since(*oldest))
            });
            return Decision::Limited { retry_after };
        }

        stamps.push(now);
        Decision::Allowed
    }

    /// Drop client entries whose newest admission has left the window.
    ///
    /// `admit` prunes per call but never removes a client that went quiet,
    /// so the map would otherwise grow with every client ever seen. Called
    /// periodically by the server.
    pub fn sweep_idle(&self) {
        let now = Instant::now();
        let mut clients = self.clients.lock();
        clients.retain(|_, stamps| {
            stamps
                .last()
                .is_some_and(|newest| now.duration_since(*newest) < self.window)
        });
    }

    /// Number of client entries currently tracked.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().len()
    }

    /// Window length, used by callers to phrase the retry hint.
    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }
}
