//! Shop account records.

use super::credential::Password;
use super::username::Username;

/// A registered account.
///
/// Users are created once at registration and never updated. Admin accounts
/// are only created through the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: Username,
    pub password: Password,
    pub is_admin: bool,
}

impl User {
    /// A regular (non-admin) shopper.
    #[must_use]
    pub const fn shopper(username: Username, password: Password) -> Self {
        Self {
            username,
            password,
            is_admin: false,
        }
    }

    /// An administrator account.
    #[must_use]
    pub const fn admin(username: Username, password: Password) -> Self {
        Self {
            username,
            password,
            is_admin: true,
        }
    }
}
