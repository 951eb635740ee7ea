//! Cache store with a networked backend and an in-process degraded mode.

use dashmap::DashMap;
use deadpool_redis::Pool;
use redis::AsyncCommands;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::CacheConfig;

/// A cached entry with TTL support.
///
/// Entries hold the serialized JSON text; `Arc` keeps hits cheap to clone.
#[derive(Clone, Debug)]
pub struct CachedEntry {
    pub data: Arc<String>,
    pub cached_at: Instant,
    pub ttl: Duration,
}

impl CachedEntry {
    /// Create a new cached entry.
    pub fn new(data: String, ttl: Duration) -> Self {
        Self {
            data: Arc::new(data),
            cached_at: Instant::now(),
            ttl,
        }
    }

    /// Check if this entry has expired.
    pub fn is_expired(&self) -> bool {
        self.cached_at.elapsed() > self.ttl
    }
}

/// The two operating modes of the store.
///
/// The networked mode keeps no local tier: keys like lockout counters must be
/// read-your-writes across instances, so every operation goes to Redis and an
/// unreachable backend degrades to a miss, never to stale local data.
#[derive(Clone)]
enum CacheBackend {
    /// In-process map, TTL enforced best-effort on read.
    Memory(Arc<DashMap<String, CachedEntry>>),

    /// Networked backend.
    Redis { redis: Pool },
}

/// Key-value store with per-key TTL and structured (JSON) values.
///
/// Built once at startup via [`CacheStore::connect`]: the networked backend
/// is attempted and, when unreachable, an in-process map transparently takes
/// its place with the same interface, logged once. All backend
/// errors on the operations below are absorbed to the miss/no-op outcome and
/// logged; callers never see a cache failure.
///
/// Degraded-mode limitation: state is process-local, lost on restart, and
/// not shared between instances.
#[derive(Clone)]
pub struct CacheStore {
    backend: CacheBackend,
    degraded: bool,
}

impl CacheStore {
    /// Create a store over the in-process map (tests, single-node dev).
    pub fn in_memory() -> Self {
        Self {
            backend: CacheBackend::Memory(Arc::new(DashMap::new())),
            degraded: false,
        }
    }

    /// Connect the configured backend, falling back to the in-process map.
    ///
    /// The fallback is logged exactly once, here; afterwards the substitution
    /// is invisible to callers.
    pub async fn connect(config: &CacheConfig) -> Self {
        if !config.enabled {
            tracing::info!("Networked cache disabled, using in-process store");
            return Self::in_memory();
        }

        tracing::info!(url = %config.url, "Connecting to Redis");

        let mut redis_config = deadpool_redis::Config::from_url(&config.url);
        let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
        pool_config.timeouts.wait = Some(Duration::from_millis(config.timeout_ms));
        pool_config.timeouts.create = Some(Duration::from_millis(config.timeout_ms));
        pool_config.timeouts.recycle = Some(Duration::from_millis(config.timeout_ms));
        redis_config.pool = Some(pool_config);

        let pool = match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
            Ok(pool) => pool,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Failed to create Redis pool. Falling back to in-process cache."
                );
                return Self::degraded();
            }
        };

        // Test the connection before committing to the networked mode
        match pool.get().await {
            Ok(_) => {
                tracing::info!("✓ Redis cache connected");
                Self {
                    backend: CacheBackend::Redis { redis: pool },
                    degraded: false,
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Redis unreachable. Falling back to in-process cache; \
                     state will be process-local and lost on restart."
                );
                Self::degraded()
            }
        }
    }

    fn degraded() -> Self {
        Self {
            backend: CacheBackend::Memory(Arc::new(DashMap::new())),
            degraded: true,
        }
    }

    /// Whether the store fell back to the in-process map at startup.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Operating mode, for health reporting.
    pub fn mode(&self) -> &'static str {
        match self.backend {
            CacheBackend::Memory(_) => "memory",
            CacheBackend::Redis { .. } => "redis",
        }
    }

    /// Get a value. Absent, expired, unparsable and backend-error cases all
    /// come back as `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match &self.backend {
            CacheBackend::Memory(map) => {
                if let Some(entry) = map.get(key) {
                    if entry.is_expired() {
                        drop(entry);
                        map.remove(key);
                        return None;
                    }
                    Some(entry.data.as_ref().clone())
                } else {
                    None
                }
            }
            CacheBackend::Redis { redis } => match redis.get().await {
                Ok(mut conn) => match conn.get::<_, Option<String>>(key).await {
                    Ok(raw) => raw,
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Redis GET error");
                        None
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to get Redis connection");
                    None
                }
            },
        }?;

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Set a value with a TTL. Returns whether the write took effect.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Duration) -> bool {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Unserializable cache value");
                return false;
            }
        };

        match &self.backend {
            CacheBackend::Memory(map) => {
                map.insert(key.to_string(), CachedEntry::new(payload, ttl));
                true
            }
            CacheBackend::Redis { redis } => match redis.get().await {
                Ok(mut conn) => {
                    // SETEX rejects a zero expiry
                    let ttl_secs = ttl.as_secs().max(1);
                    match conn.set_ex::<_, _, ()>(key, payload, ttl_secs).await {
                        Ok(()) => {
                            tracing::debug!(key = %key, ttl_secs = %ttl_secs, "cache set");
                            true
                        }
                        Err(e) => {
                            tracing::warn!(key = %key, error = %e, "Redis SET error");
                            false
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to get Redis connection");
                    false
                }
            },
        }
    }

    /// Delete a key. Returns whether a live entry was removed.
    pub async fn delete(&self, key: &str) -> bool {
        match &self.backend {
            CacheBackend::Memory(map) => match map.remove(key) {
                Some((_, entry)) => !entry.is_expired(),
                None => false,
            },
            CacheBackend::Redis { redis } => match redis.get().await {
                Ok(mut conn) => match conn.del::<_, i64>(key).await {
                    Ok(removed) => removed > 0,
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "Redis DEL error");
                        false
                    }
                },
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to get Redis connection");
                    false
                }
            },
        }
    }

    /// Drop every key. Admin/dev only.
    pub async fn flush_all(&self) -> bool {
        match &self.backend {
            CacheBackend::Memory(map) => {
                map.clear();
                true
            }
            CacheBackend::Redis { redis } => match redis.get().await {
                Ok(mut conn) => {
                    let flushed: redis::RedisResult<()> =
                        redis::cmd("FLUSHDB").query_async(&mut conn).await;
                    match flushed {
                        Ok(()) => true,
                        Err(e) => {
                            tracing::warn!(error = %e, "Redis FLUSHDB error");
                            false
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to get Redis connection");
                    false
                }
            },
        }
    }
}
