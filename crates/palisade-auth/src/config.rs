//! Authentication configuration.

use serde::{Deserialize, Serialize};

fn default_secret() -> String {
    // Development-only default; deployments must override it
    "palisade-dev-secret-change-me".to_string()
}

fn default_token_ttl_seconds() -> u64 {
    // 24 hours
    86_400
}

fn default_cookie_name() -> String {
    "access_token".to_string()
}

fn default_cookie_secure() -> bool {
    false
}

fn default_skip_paths() -> Vec<String> {
    [
        "/",
        "/health",
        "/version",
        "/auth/login",
        "/auth/logout",
        "/auth/register",
        "/auth/create",
        "/auth/check-email",
        "/auth/validate-password",
        "/auth/roles",
        "/docs",
        "/redoc",
        "/openapi.json",
        "/static",
        "/favicon.ico",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Authentication gate and token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret.
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Access token lifetime in seconds.
    #[serde(default = "default_token_ttl_seconds")]
    pub token_ttl_seconds: u64,

    /// Cookie used as the primary credential carrier.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    /// Mark the login cookie `Secure` (HTTPS-only deployments).
    #[serde(default = "default_cookie_secure")]
    pub cookie_secure: bool,

    /// Paths the gate lets through without credentials.
    #[serde(default = "default_skip_paths")]
    pub skip_paths: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            token_ttl_seconds: default_token_ttl_seconds(),
            cookie_name: default_cookie_name(),
            cookie_secure: default_cookie_secure(),
            skip_paths: default_skip_paths(),
        }
    }
}

impl AuthConfig {
    /// Whether a request path may pass the gate without credentials.
    ///
    /// Entries match exactly or as a path-segment prefix; the bare root
    /// entry only ever matches `/` itself.
    #[must_use]
    pub fn is_public(&self, path: &str) -> bool {
        self.skip_paths.iter().any(|entry| {
            if entry == "/" {
                path == "/"
            } else {
                path == entry || path.starts_with(&format!("{entry}/"))
            }
        })
    }

    /// Whether the secret is still the development default.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.secret == default_secret()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.secret.len() < 16 {
            return Err("auth.secret must be at least 16 characters".to_string());
        }
        if self.token_ttl_seconds == 0 {
            return Err("auth.token_ttl_seconds must be greater than 0".to_string());
        }
        if self.cookie_name.is_empty() {
            return Err("auth.cookie_name cannot be empty".to_string());
        }
        Ok(())
    }
}
