//! Authentication error types.

use thiserror::Error;

use pickles_core::{PasswordError, UsernameError};

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid username format.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Password missing or invalid.
    #[error("invalid password: {0}")]
    InvalidPassword(#[from] PasswordError),

    /// Wrong password or unknown user.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Valid credentials, but the account is not an administrator.
    #[error("invalid admin credentials")]
    NotAdmin,

    /// Username already registered.
    #[error("username already taken")]
    UsernameTaken,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
