//! Authentication service.
//!
//! Registration, shopper login and admin login against the identity store.
//! Passwords are compared as opaque credentials.

mod error;

pub use error::AuthError;

use tracing::{info, instrument, warn};

use pickles_core::{Password, User, Username};

use crate::db::{RepositoryError, ShopStore};
use crate::models::CurrentUser;

/// Authentication service.
pub struct AuthService<'a> {
    users: &'a dyn ShopStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(users: &'a dyn ShopStore) -> Self {
        Self { users }
    }

    /// Register a new (non-admin) account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername`/`InvalidPassword` for malformed input.
    /// Returns `AuthError::UsernameTaken` if the username is already registered.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let username = Username::parse(username)?;
        let password = Password::new(password)?;

        let user = User::shopper(username, password);
        self.users
            .insert_user_if_absent(&user)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::Repository(other),
            })?;

        info!(username = %user.username, "Account registered");
        Ok(CurrentUser {
            username: user.username,
            is_admin: false,
        })
    }

    /// Verify shopper credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the user does not exist or
    /// the password does not match.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let user = self.verify(username, password).await?;
        Ok(CurrentUser {
            username: user.username,
            is_admin: user.is_admin,
        })
    }

    /// Verify administrator credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAdmin` for wrong credentials and for valid
    /// credentials of a non-admin account alike.
    #[instrument(skip(self, password))]
    pub async fn admin_login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<CurrentUser, AuthError> {
        let user = self.verify(username, password).await.map_err(|e| match e {
            AuthError::InvalidCredentials => AuthError::NotAdmin,
            other => other,
        })?;

        if !user.is_admin {
            warn!(username = %user.username, "Non-admin attempted admin login");
            return Err(AuthError::NotAdmin);
        }

        Ok(CurrentUser {
            username: user.username,
            is_admin: true,
        })
    }

    async fn verify(&self, username: &str, password: &str) -> Result<User, AuthError> {
        // Malformed input can never match a stored account.
        let Ok(username) = Username::parse(username) else {
            return Err(AuthError::InvalidCredentials);
        };
        let Ok(password) = Password::new(password) else {
            return Err(AuthError::InvalidCredentials);
        };

        let user = self
            .users
            .get_user(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.password.matches(&password) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::{IdentityStore, MemoryStore};

    async fn store_with_admin() -> MemoryStore {
        let store = MemoryStore::new();
        let admin = User::admin(
            Username::parse("root").unwrap(),
            Password::new("hunter2").unwrap(),
        );
        store.insert_user_if_absent(&admin).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let user = auth.register("alice", "brine").await.unwrap();
        assert!(!user.is_admin);

        let logged_in = auth.login("alice", "brine").await.unwrap();
        assert_eq!(logged_in.username.as_str(), "alice");
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        auth.register("alice", "brine").await.unwrap();
        let err = auth.register("alice", "other").await.unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_input() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        assert!(matches!(
            auth.register("", "brine").await,
            Err(AuthError::InvalidUsername(_))
        ));
        assert!(matches!(
            auth.register("alice", "").await,
            Err(AuthError::InvalidPassword(_))
        ));
    }

    #[tokio::test]
    async fn test_login_wrong_password_or_unknown_user() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);
        auth.register("alice", "brine").await.unwrap();

        assert!(matches!(
            auth.login("alice", "vinegar").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("bob", "brine").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_admin_login_requires_admin_flag() {
        let store = store_with_admin().await;
        let auth = AuthService::new(&store);
        auth.register("alice", "brine").await.unwrap();

        assert!(auth.admin_login("root", "hunter2").await.unwrap().is_admin);
        assert!(matches!(
            auth.admin_login("alice", "brine").await,
            Err(AuthError::NotAdmin)
        ));
        assert!(matches!(
            auth.admin_login("root", "wrong").await,
            Err(AuthError::NotAdmin)
        ));
    }
}
