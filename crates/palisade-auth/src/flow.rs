//! Login, registration and token-to-actor resolution.
//!
//! [`AuthFlow`] owns the ordering contract around the lockout guard:
//! check the lock before touching credentials, then record the failure or
//! reset the counter depending on how verification went. Handlers and the
//! authentication gate call into this type instead of wiring the pieces
//! themselves.

use crate::actor::{Actor, Role};
use crate::error::{AuthError, AuthResult};
use crate::lockout::LockoutGuard;
use crate::password::{hash_password, verify_password};
use crate::policy;
use crate::storage::{AuthUser, DynUserStore, NewUser};
use crate::token::TokenService;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The issued access token.
    pub token: String,
    /// Token lifetime in seconds, for the response body and cookie.
    pub expires_in: u64,
    /// The authenticated account.
    pub user: AuthUser,
}

/// Drives authentication against a user store, lockout guard and token
/// service.
#[derive(Clone)]
pub struct AuthFlow {
    users: DynUserStore,
    lockout: LockoutGuard,
    tokens: TokenService,
}

impl AuthFlow {
    /// Wire the flow together from explicit parts.
    #[must_use]
    pub fn new(users: DynUserStore, lockout: LockoutGuard, tokens: TokenService) -> Self {
        Self {
            users,
            lockout,
            tokens,
        }
    }

    /// The lockout guard, for the read-only admin view.
    #[must_use]
    pub fn lockout(&self) -> &LockoutGuard {
        &self.lockout
    }

    /// Authenticate an email/password pair and issue a token.
    ///
    /// Unknown emails and inactive accounts count as credential failures so
    /// the response does not reveal which accounts exist. Failures feed the
    /// lockout guard; success clears it.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Locked`] when the account is locked, before and
    ///   including the failure that triggers the lock
    /// - [`AuthError::InvalidCredentials`] with the remaining attempt count
    /// - [`AuthError::Storage`] / [`AuthError::Internal`] on backend failures
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<LoginOutcome> {
        let (locked, remaining) = self.lockout.check_locked(email).await;
        if locked {
            return Err(AuthError::Locked {
                remaining_seconds: remaining.unwrap_or(0),
            });
        }

        let user = self.users.find_by_email(email).await?;
        let verified = match &user {
            // A corrupt stored hash reads as a mismatch, not a server error
            Some(user) if user.active => {
                verify_password(password, &user.password_hash).unwrap_or(false)
            }
            _ => false,
        };

        if !verified {
            let (attempts, now_locked) = self.lockout.record_failure(email).await;
            if now_locked {
                let (_, remaining) = self.lockout.check_locked(email).await;
                return Err(AuthError::Locked {
                    remaining_seconds: remaining.unwrap_or(0),
                });
            }
            let left = self
                .lockout
                .max_failed_attempts()
                .saturating_sub(attempts);
            return Err(AuthError::InvalidCredentials {
                remaining_attempts: Some(left),
            });
        }

        // The match above guarantees Some here
        let Some(user) = user else {
            return Err(AuthError::internal("verified login with no user record"));
        };

        self.lockout.reset(email).await;
        let token = self.tokens.issue(user.id, &user.email)?;
        tracing::info!(user_id = user.id, email = %user.email, "User logged in");

        Ok(LoginOutcome {
            token,
            expires_in: self.tokens.ttl_seconds(),
            user,
        })
    }

    /// Create a new member account.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` for a malformed email, a password violating
    /// the policy in [`crate::policy`], or an email that is already
    /// registered.
    pub async fn register(&self, email: &str, name: &str, password: &str) -> AuthResult<AuthUser> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AuthError::invalid_request("A valid email is required"));
        }
        if let Err(violations) = policy::validate(password) {
            return Err(AuthError::invalid_request(format!(
                "Password does not meet security requirements: {}",
                violations.join("; ")
            )));
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::invalid_request("Email already registered"));
        }

        let password_hash = hash_password(password)
            .map_err(|e| AuthError::internal(format!("password hashing failed: {e}")))?;
        let user = self
            .users
            .create(NewUser {
                email,
                name: name.trim().to_string(),
                password_hash,
                role: Role::Member,
            })
            .await?;
        tracing::info!(user_id = user.id, email = %user.email, "New account registered");
        Ok(user)
    }

    /// Whether an email is free to register.
    ///
    /// # Errors
    ///
    /// Returns an error if the user store fails.
    pub async fn email_available(&self, email: &str) -> AuthResult<bool> {
        Ok(self.users.find_by_email(email).await?.is_none())
    }

    /// Resolve a bearer token to its actor.
    ///
    /// # Errors
    ///
    /// Returns `TokenExpired` or `InvalidToken` for bad tokens, including
    /// tokens whose subject has since been removed or disabled.
    pub async fn authenticate(&self, token: &str) -> AuthResult<Actor> {
        let claims = self.tokens.verify(token)?;
        let user_id = claims.user_id()?;
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AuthError::invalid_token("token subject no longer exists"))?;
        if !user.active {
            return Err(AuthError::invalid_token("account disabled"));
        }
        Ok(user.to_actor())
    }
}
