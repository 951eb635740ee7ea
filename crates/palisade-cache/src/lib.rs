//! # palisade-cache
//!
//! Key-value cache for Palisade with per-key TTLs and structured (JSON)
//! values. Backs the lockout guard and any handler-level caching.
//!
//! ## Backends
//!
//! - **Redis** (via `deadpool-redis`) for multi-instance deployments
//! - **In-process** (`DashMap`) for tests, single-node dev, and degraded mode
//!
//! ## Graceful Degradation
//!
//! [`CacheStore::connect`] tries the networked backend once at startup. If
//! it is unreachable the store silently substitutes the in-process map:
//! same API, one log line, no error. Runtime backend errors are likewise
//! absorbed: reads become misses, writes report `false`.
//!
//! ```ignore
//! let cache = CacheStore::connect(&config.cache).await;
//! cache.set("session:42", &session, Duration::from_secs(300)).await;
//! let session: Option<Session> = cache.get("session:42").await;
//! ```

pub mod config;
pub mod store;

pub use config::CacheConfig;
pub use store::{CacheStore, CachedEntry};
