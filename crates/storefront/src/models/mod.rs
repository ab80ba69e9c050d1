//! Storefront-side models.
//!
//! Catalog, order and account records live in `pickles-core`; this module
//! holds what only the web tier needs.

pub mod session;

pub use session::{CurrentUser, ShopSession, keys as session_keys};
