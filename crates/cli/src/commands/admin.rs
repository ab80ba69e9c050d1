//! Admin account management commands.
//!
//! Admin accounts cannot be registered over HTTP; this is the only way to
//! create one.
//!
//! # Usage
//!
//! ```bash
//! pickles-cli admin create -u admin -p 's3cret'
//! ```

use thiserror::Error;

use pickles_core::{Password, PasswordError, User, Username, UsernameError};
use pickles_storefront::db::{IdentityStore, PgStore, RepositoryError};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Username failed validation.
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Password failed validation.
    #[error("Invalid password: {0}")]
    InvalidPassword(#[from] PasswordError),

    /// An account with this username already exists.
    #[error("Account already exists with username: {0}")]
    UserExists(String),

    /// Database error.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Could not connect to the database.
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Validate the inputs of an admin account.
fn build_admin(username: &str, password: &str) -> Result<User, AdminError> {
    Ok(User::admin(Username::parse(username)?, Password::new(password)?))
}

/// Create a new admin account.
///
/// # Errors
///
/// Returns an error if the inputs are invalid, the username is taken, or the
/// database is unreachable.
pub async fn create_user(username: &str, password: &str) -> Result<(), AdminError> {
    let admin = build_admin(username, password)?;

    let pool = super::connect()
        .await
        .map_err(|e| AdminError::Connection(e.to_string()))?;
    let store = PgStore::new(pool);

    tracing::info!("Creating admin account: {}", admin.username);

    match store.insert_user_if_absent(&admin).await {
        Ok(()) => {}
        Err(RepositoryError::Conflict(_)) => {
            return Err(AdminError::UserExists(admin.username.into_inner()));
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(
        "Admin account created successfully! Username: {}",
        admin.username
    );
    Ok(())
}
