//! Account credential types.
//!
//! Passwords are stored and compared as opaque strings; the storefront does
//! not hash them. The wrapper exists so a password can never end up in a log
//! line or a serialized response by accident.

use core::fmt;

use serde::Deserialize;

/// Errors that can occur when creating a [`Password`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PasswordError {
    /// The input is empty.
    #[error("password cannot be empty")]
    Empty,
}

/// An opaque account password.
///
/// `Debug` output is redacted and the type deliberately does not implement
/// `Serialize` or `Display`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Password(String);

impl Password {
    /// Create a password from user input.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordError::Empty`] if the input is empty.
    pub fn new(value: impl Into<String>) -> Result<Self, PasswordError> {
        let value = value.into();
        if value.is_empty() {
            return Err(PasswordError::Empty);
        }
        Ok(Self(value))
    }

    /// Whether a login attempt presented this password.
    #[must_use]
    pub fn matches(&self, candidate: &Self) -> bool {
        self.0 == candidate.0
    }

    /// Expose the raw value for persistence.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

impl TryFrom<String> for Password {
    type Error = PasswordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
