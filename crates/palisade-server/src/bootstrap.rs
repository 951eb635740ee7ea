//! Startup bootstrap: seed the admin account when configured.

use crate::audit_log::{self, LogContext};
use crate::config::BootstrapConfig;
use palisade_auth::{DynUserStore, NewUser, Role, password::hash_password};

/// Ensure the configured admin account exists.
///
/// Runs once at startup, before the listener binds. Skipped entirely unless
/// both `bootstrap.admin_email` and `bootstrap.admin_password` are set.
/// Failures are logged and swallowed so a flaky user store cannot keep the
/// whole server down.
pub async fn ensure_admin(users: &DynUserStore, bootstrap: &BootstrapConfig) {
    let (Some(email), Some(password)) = (&bootstrap.admin_email, &bootstrap.admin_password) else {
        return;
    };

    match users.find_by_email(email).await {
        Ok(Some(_)) => {
            tracing::debug!(email = %email, "Bootstrap admin already present");
            return;
        }
        Ok(None) => {}
        Err(err) => {
            tracing::warn!(error = %err, "Bootstrap admin lookup failed");
            return;
        }
    }

    let password_hash = match hash_password(password) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::warn!(error = %err, "Bootstrap admin password hashing failed");
            return;
        }
    };

    match users
        .create(NewUser {
            email: email.trim().to_lowercase(),
            name: bootstrap.admin_name.clone(),
            password_hash,
            role: Role::Admin,
        })
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = user.id, email = %user.email, "✓ Bootstrap admin created");
            audit_log::info(
                "Bootstrap admin created",
                &LogContext::for_actor(&user.email),
            );
        }
        Err(err) => tracing::warn!(error = %err, "Bootstrap admin creation failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palisade_db_memory::create_user_store;

    fn config(email: Option<&str>, password: Option<&str>) -> BootstrapConfig {
        BootstrapConfig {
            admin_email: email.map(String::from),
            admin_password: password.map(String::from),
            admin_name: "Administrator".to_string(),
        }
    }

    #[tokio::test]
    async fn test_seeds_admin_once() {
        let users = create_user_store();
        let bootstrap = config(Some("root@example.com"), Some("Sup3r!Secret"));

        ensure_admin(&users, &bootstrap).await;
        let user = users
            .find_by_email("root@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.name, "Administrator");

        // Second run is a no-op rather than a duplicate-email error
        ensure_admin(&users, &bootstrap).await;
        assert!(
            users
                .find_by_email("root@example.com")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[tokio::test]
    async fn test_unconfigured_bootstrap_is_a_noop() {
        let users = create_user_store();
        ensure_admin(&users, &config(None, None)).await;
        assert!(
            users
                .find_by_email("root@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }
}
