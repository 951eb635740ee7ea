//! Application configuration.
//!
//! One [`AppConfig`] tree covers the listener, logging, CORS, storage
//! backend selection, cache, authentication, lockout, rate limiting, audit
//! and the optional bootstrap admin account. Every field has a default so a
//! bare process starts with no configuration at all; a TOML file and
//! `PALISADE__`-prefixed environment variables override selectively.

use palisade_auth::{AuthConfig, lockout::LockoutConfig};
use palisade_cache::CacheConfig;
use serde::{Deserialize, Serialize};

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Level filter applied unless `RUST_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

/// CORS settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins; the single entry `*` selects a permissive layer
    /// without credentials, explicit origins allow credentials.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl CorsConfig {
    /// Whether the wildcard permissive mode is selected.
    #[must_use]
    pub fn is_permissive(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

fn default_storage_backend() -> String {
    "memory".to_string()
}

/// Durable store selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Audit/user store backend.
    #[serde(default = "default_storage_backend")]
    pub backend: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self.backend.as_str() {
            "memory" => Ok(()),
            other => Err(format!(
                "storage.backend '{other}' is not supported (expected 'memory')"
            )),
        }
    }
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_quota() -> u32 {
    20
}

fn default_window_ms() -> u64 {
    1000
}

fn default_exempt_paths() -> Vec<String> {
    ["/api/docs", "/docs", "/openapi.json", "/health"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_sweep_interval_seconds() -> u64 {
    60
}

/// Sliding-window rate limiter settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,

    /// Admissions per client within one window.
    #[serde(default = "default_quota")]
    pub quota: u32,

    /// Window length in milliseconds.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Path prefixes never limited.
    #[serde(default = "default_exempt_paths")]
    pub exempt_paths: Vec<String>,

    /// How often idle client entries are evicted; 0 disables the sweep.
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            quota: default_quota(),
            window_ms: default_window_ms(),
            exempt_paths: default_exempt_paths(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
        }
    }
}

impl RateLimitConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.quota == 0 {
            return Err("rate_limit.quota must be greater than 0".to_string());
        }
        if self.window_ms == 0 {
            return Err("rate_limit.window_ms must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn default_audit_enabled() -> bool {
    true
}

fn default_audit_skip_paths() -> Vec<String> {
    ["/docs", "/redoc", "/openapi.json", "/static", "/favicon.ico"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Audit pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,

    /// Path prefixes excluded from auditing to cut noise.
    #[serde(default = "default_audit_skip_paths")]
    pub skip_paths: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: default_audit_enabled(),
            skip_paths: default_audit_skip_paths(),
        }
    }
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

/// Optional admin account seeded at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Email of the seed admin; bootstrap is skipped when unset.
    #[serde(default)]
    pub admin_email: Option<String>,

    /// Plaintext password, hashed at startup.
    #[serde(default)]
    pub admin_password: Option<String>,

    #[serde(default = "default_admin_name")]
    pub admin_name: String,
}

/// Root configuration tree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub cors: CorsConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub lockout: LockoutConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    /// Validate the whole tree.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.host.is_empty() {
            return Err("server.host cannot be empty".to_string());
        }
        self.storage.validate()?;
        self.cache.validate()?;
        self.auth.validate()?;
        self.lockout.validate()?;
        self.rate_limit.validate()?;
        if let (Some(_), None) | (None, Some(_)) =
            (&self.bootstrap.admin_email, &self.bootstrap.admin_password)
        {
            return Err(
                "bootstrap.admin_email and bootstrap.admin_password must be set together"
                    .to_string(),
            );
        }
        Ok(())
    }
}

pub mod loader {
    //! Configuration loading: TOML file plus environment overrides.

    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::fmt;
    use std::path::{Path, PathBuf};

    /// Where the configuration is read from.
    #[derive(Debug, Clone)]
    pub enum ConfigSource {
        /// Built-in defaults plus environment overrides only.
        Defaults,
        /// A TOML file plus environment overrides.
        File(PathBuf),
    }

    impl fmt::Display for ConfigSource {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Defaults => f.write_str("built-in defaults"),
                Self::File(path) => write!(f, "{}", path.display()),
            }
        }
    }

    /// Resolve the configuration source: an explicit path argument wins,
    /// then the `PALISADE_CONFIG` variable, then `palisade.toml` in the
    /// working directory if present.
    #[must_use]
    pub fn resolve_source(arg: Option<&str>) -> ConfigSource {
        if let Some(path) = arg {
            return ConfigSource::File(PathBuf::from(path));
        }
        if let Ok(path) = std::env::var("PALISADE_CONFIG") {
            return ConfigSource::File(PathBuf::from(path));
        }
        let fallback = Path::new("palisade.toml");
        if fallback.exists() {
            return ConfigSource::File(fallback.to_path_buf());
        }
        ConfigSource::Defaults
    }

    /// Load and validate the configuration.
    ///
    /// Environment variables use the `PALISADE__` prefix with `__` as the
    /// section separator, e.g. `PALISADE__SERVER__PORT=9090`.
    ///
    /// # Errors
    ///
    /// Returns a message when the file cannot be read, a value does not
    /// deserialize, or validation fails.
    pub fn load(source: &ConfigSource) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        if let ConfigSource::File(path) = source {
            builder = builder.add_source(File::from(path.as_path()));
        }
        let raw = builder
            .add_source(
                Environment::with_prefix("PALISADE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| format!("failed to read configuration: {e}"))?;
        let config: AppConfig = raw
            .try_deserialize()
            .map_err(|e| format!("invalid configuration: {e}"))?;
        config.validate()?;
        Ok(config)
    }
}
