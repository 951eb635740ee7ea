//! # palisade-auth
//!
//! Authentication for Palisade: password login with account lockout, HS256
//! access tokens, and the [`Actor`] type the authentication gate attaches
//! to requests.
//!
//! The pieces are explicit instances wired together by the application:
//!
//! ```ignore
//! let lockout = LockoutGuard::new(cache.clone(), config.lockout.clone());
//! let tokens = TokenService::new(&config.auth.secret, config.auth.token_ttl_seconds);
//! let flow = AuthFlow::new(user_store, lockout, tokens);
//!
//! match flow.login(&email, &password).await {
//!     Ok(outcome) => { /* set cookie, return token */ }
//!     Err(err) => return err.into_response(),
//! }
//! ```

pub mod actor;
pub mod config;
pub mod error;
pub mod flow;
pub mod lockout;
pub mod password;
pub mod policy;
pub mod storage;
pub mod token;

pub use actor::{Actor, Role};
pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use flow::{AuthFlow, LoginOutcome};
pub use lockout::{LockoutConfig, LockoutGuard, LockoutStatus};
pub use storage::{AuthUser, DynUserStore, NewUser, UserStore};
pub use token::{Claims, TokenService};
