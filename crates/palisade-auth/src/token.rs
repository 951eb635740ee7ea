//! Access token issuing and validation.
//!
//! Tokens are HS256 JWTs carrying the user id in `sub` plus the email for
//! log correlation. Expiry is enforced by the library during decode.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::{AuthError, AuthResult};

/// Claims carried in an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, stringified.
    pub sub: String,

    /// Email at issue time.
    pub email: String,

    /// Issued-at, unix seconds.
    pub iat: i64,

    /// Expiry, unix seconds.
    pub exp: i64,
}

impl Claims {
    /// The user id parsed back out of `sub`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidToken` when `sub` is not a numeric id.
    pub fn user_id(&self) -> AuthResult<i64> {
        self.sub
            .parse()
            .map_err(|_| AuthError::invalid_token(format!("non-numeric sub claim: {}", self.sub)))
    }
}

/// Issues and validates HS256 access tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: u64,
}

impl TokenService {
    /// Create a service around a shared secret.
    #[must_use]
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }

    /// Token lifetime in seconds.
    #[must_use]
    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a token for a user.
    ///
    /// # Errors
    ///
    /// Returns `Internal` if encoding fails.
    pub fn issue(&self, user_id: i64, email: &str) -> AuthResult<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + self.ttl_seconds as i64,
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::internal(format!("token encoding failed: {e}")))
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenExpired` for an expired signature and `InvalidToken`
    /// for anything else the decoder rejects.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(AuthError::TokenExpired),
                _ => Err(AuthError::invalid_token(e.to_string())),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("unit-test-secret", 3600)
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let svc = service();
        let token = svc.issue(42, "alice@example.com").unwrap();
        let claims = svc.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.email, "alice@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue(1, "a@b.c").unwrap();
        let other = TokenService::new("different-secret", 3600);
        let err = other.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[test]
    fn test_expired_token_rejected() {
        // TTL in the past: exp = iat - 120, well beyond default leeway
        let svc = TokenService::new("unit-test-secret", 0);
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: "1".to_string(),
            email: "a@b.c".to_string(),
            iat: now - 240,
            exp: now - 120,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();
        let err = svc.verify(&token).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let err = service().verify("not.a.jwt").unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }

    #[test]
    fn test_non_numeric_sub_rejected() {
        let claims = Claims {
            sub: "alice".to_string(),
            email: "a@b.c".to_string(),
            iat: 0,
            exp: 0,
        };
        assert!(claims.user_id().is_err());
    }
}
