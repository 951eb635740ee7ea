//! Cache backend configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the cache backing store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Attempt the networked backend at startup (gracefully degrades to the
    /// in-process map when unreachable). Set false to skip the attempt.
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Redis connection URL (e.g., "redis://localhost:6379")
    #[serde(default = "default_cache_url")]
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_cache_pool_size")]
    pub pool_size: usize,

    /// Connection timeout in milliseconds
    #[serde(default = "default_cache_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_cache_pool_size() -> usize {
    10
}

fn default_cache_timeout_ms() -> u64 {
    5000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            url: default_cache_url(),
            pool_size: default_cache_pool_size(),
            timeout_ms: default_cache_timeout_ms(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.enabled && self.url.is_empty() {
            return Err("cache.url must not be empty when cache.enabled".into());
        }
        if self.pool_size == 0 {
            return Err("cache.pool_size must be > 0".into());
        }
        if self.timeout_ms == 0 {
            return Err("cache.timeout_ms must be > 0".into());
        }
        Ok(())
    }
}
