//! Session-related types.
//!
//! Typed access to the values the storefront keeps in `tower-sessions`:
//! the logged-in identity and the shopping cart.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use pickles_core::{Cart, Username};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account username.
    pub username: Username,
    /// Whether the account may use the admin routes.
    pub is_admin: bool,
}

/// Session keys for storefront data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for storing the cart.
    pub const CART: &str = "cart";
}

/// Typed view of one visitor's session.
///
/// Cheap to clone; clones share the same underlying session record.
#[derive(Debug, Clone)]
pub struct ShopSession {
    inner: Session,
}

impl ShopSession {
    /// Wrap a `tower-sessions` session.
    #[must_use]
    pub const fn new(inner: Session) -> Self {
        Self { inner }
    }

    /// The cart, or an empty one if nothing has been added yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn cart(&self) -> Result<Cart, tower_sessions::session::Error> {
        Ok(self.inner.get::<Cart>(keys::CART).await?.unwrap_or_default())
    }

    /// Replace the stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save_cart(&self, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
        self.inner.insert(keys::CART, cart).await
    }

    /// Drop the stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn clear_cart(&self) -> Result<(), tower_sessions::session::Error> {
        self.inner.remove::<Cart>(keys::CART).await?;
        Ok(())
    }

    /// The logged-in user, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn current_user(&self) -> Result<Option<CurrentUser>, tower_sessions::session::Error> {
        self.inner.get(keys::CURRENT_USER).await
    }

    /// Record a successful login, rotating the session ID first.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn set_current_user(
        &self,
        user: &CurrentUser,
    ) -> Result<(), tower_sessions::session::Error> {
        self.inner.cycle_id().await?;
        self.inner.insert(keys::CURRENT_USER, user).await
    }

    /// Forget the identity and the cart (logout).
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted from the store.
    pub async fn clear(&self) -> Result<(), tower_sessions::session::Error> {
        self.inner.flush().await
    }
}
