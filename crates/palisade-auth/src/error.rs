//! Authentication and authorization error types.
//!
//! Every variant maps to a concrete HTTP response via `IntoResponse`, with a
//! `{"detail": ...}` JSON body matching the rest of the API surface.

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Result alias for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur during authentication and authorization operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request carries no credentials at all.
    #[error("Not authenticated")]
    MissingCredentials,

    /// The access token is invalid, malformed, or cannot be parsed.
    #[error("Invalid token: {message}")]
    InvalidToken {
        /// Description of why the token is invalid.
        message: String,
    },

    /// The access token has expired.
    #[error("Token expired")]
    TokenExpired,

    /// The email/password pair did not match.
    #[error("Invalid credentials")]
    InvalidCredentials {
        /// How many attempts remain before the account locks, when known.
        remaining_attempts: Option<u32>,
    },

    /// The account is locked after repeated failed attempts.
    #[error("Account locked for {remaining_seconds}s")]
    Locked {
        /// Seconds until the lockout expires.
        remaining_seconds: u64,
    },

    /// The authenticated user does not have permission to perform the action.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Description of why access is forbidden.
        message: String,
    },

    /// The request is invalid or malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of why the request is invalid.
        message: String,
    },

    /// An error occurred while storing or retrieving auth data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `InvalidToken` error.
    #[must_use]
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    /// Creates a new `Forbidden` error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a client error (4xx category).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Storage { .. } | Self::Internal { .. })
    }

    /// Returns `true` if this error means the caller failed to prove identity.
    #[must_use]
    pub fn is_authentication_error(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials
                | Self::InvalidToken { .. }
                | Self::TokenExpired
                | Self::InvalidCredentials { .. }
        )
    }

    /// The HTTP status this error maps to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredentials
            | Self::InvalidToken { .. }
            | Self::TokenExpired
            | Self::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            Self::Locked { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Storage { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The user-facing message placed in the `detail` field.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::MissingCredentials => "Not authenticated".to_string(),
            Self::InvalidToken { .. } => "Could not validate credentials".to_string(),
            Self::TokenExpired => "Token has expired".to_string(),
            Self::InvalidCredentials {
                remaining_attempts: Some(n),
            } => format!(
                "Incorrect email or password ({n} attempt{} remaining)",
                if *n == 1 { "" } else { "s" }
            ),
            Self::InvalidCredentials {
                remaining_attempts: None,
            } => "Incorrect email or password".to_string(),
            Self::Locked { remaining_seconds } => {
                let minutes = remaining_seconds.div_ceil(60);
                format!(
                    "Too many failed login attempts. Try again in {minutes} minute{}.",
                    if minutes == 1 { "" } else { "s" }
                )
            }
            Self::Forbidden { message } | Self::InvalidRequest { message } => message.clone(),
            // Internal detail stays in the logs, not in the response
            Self::Storage { .. } | Self::Internal { .. } => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({ "detail": self.detail() });

        let mut headers = HeaderMap::new();
        if status == StatusCode::UNAUTHORIZED {
            headers.insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        if let Self::Locked { remaining_seconds } = &self
            && let Ok(value) = HeaderValue::from_str(&remaining_seconds.to_string())
        {
            headers.insert(header::RETRY_AFTER, value);
        }

        if status.is_server_error() {
            tracing::error!(error = %self, "auth pipeline failure");
        }

        (status, headers, Json(body)).into_response()
    }
}
