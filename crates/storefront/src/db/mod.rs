//! Storage ports and adapters for the storefront.
//!
//! The checkout workflow and the HTTP layer only see the traits defined here:
//!
//! - [`CatalogStore`] - products and their stock levels
//! - [`OrderStore`] - append-only order records
//! - [`IdentityStore`] - registered accounts
//! - [`CheckoutLedger`] - all-or-nothing commit of one checkout
//!
//! [`ShopStore`] bundles them for the application state. Two adapters exist:
//! [`PgStore`] backed by `PostgreSQL` through `sqlx`, and [`MemoryStore`]
//! used by tests and local development.

mod checkout;
pub mod memory;
mod orders;
mod products;
mod users;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use pickles_core::{NewProduct, Order, Product, ProductId, User, Username};

pub use memory::MemoryStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data violates a domain invariant.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Record already exists (unique key taken).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced product does not exist.
    #[error("product {0} does not exist")]
    UnknownProduct(ProductId),

    /// A conditional decrement would take stock below zero.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// A restock would push stock past [`pickles_core::MAX_STOCK`].
    #[error("restocking product {product_id} by {amount} would exceed the stock limit")]
    StockLimit { product_id: ProductId, amount: u32 },

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Products and their stock levels.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Fetch a product by ID.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Fetch every product, ordered by name.
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Insert a new product, assigning it a fresh ID.
    async fn insert_product(&self, product: NewProduct) -> Result<Product, RepositoryError>;

    /// Atomically take `amount` units from stock, returning the remaining quantity.
    ///
    /// Fails with [`RepositoryError::InsufficientStock`] instead of letting the
    /// quantity go negative.
    async fn decrement_stock(&self, id: ProductId, amount: u32) -> Result<u32, RepositoryError>;

    /// Add `amount` units to stock, returning the new quantity.
    ///
    /// Fails with [`RepositoryError::StockLimit`] rather than exceed
    /// [`pickles_core::MAX_STOCK`].
    async fn restock(&self, id: ProductId, amount: u32) -> Result<u32, RepositoryError>;
}

/// Append-only order records.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Write a single order. A duplicate order ID is a [`RepositoryError::Conflict`].
    async fn put_order(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Fetch every order, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError>;
}

/// Registered accounts.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Fetch a user by username.
    async fn get_user(&self, username: &Username) -> Result<Option<User>, RepositoryError>;

    /// Create a user only if the username is not taken.
    ///
    /// Returns [`RepositoryError::Conflict`] when it is.
    async fn insert_user_if_absent(&self, user: &User) -> Result<(), RepositoryError>;
}

/// Commits the writes of one checkout as a single unit.
#[async_trait]
pub trait CheckoutLedger: Send + Sync {
    /// Decrement stock for every order line and write every order, or do
    /// nothing at all.
    ///
    /// The first line that cannot be satisfied aborts the whole commit with
    /// [`RepositoryError::InsufficientStock`] or
    /// [`RepositoryError::UnknownProduct`].
    async fn commit_checkout(&self, orders: &[Order]) -> Result<(), RepositoryError>;
}

/// Every storage port the storefront needs.
#[async_trait]
pub trait ShopStore: CatalogStore + OrderStore + IdentityStore + CheckoutLedger {
    /// Cheap round trip used by the readiness check.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// `PostgreSQL` implementation of the storage ports.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ShopStore for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns an error if the database connection fails.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// A store on the database named by `STOREFRONT_DATABASE_URL` (or
/// `DATABASE_URL`), migrated to the current schema.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
async fn migrated_test_store() -> PgStore {
    let url = crate::config::get_database_url("STOREFRONT_DATABASE_URL").unwrap();
    let pool = create_pool(&url).await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    PgStore::new(pool)
}

/// Convert a database quantity column into stock units.
fn quantity_from_db(value: i32, what: &str) -> Result<u32, RepositoryError> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("negative {what}: {value}")))
}

/// Convert stock units into the database's `INTEGER` range.
fn quantity_to_db(value: u32) -> Result<i32, RepositoryError> {
    i32::try_from(value)
        .map_err(|_| RepositoryError::DataCorruption(format!("quantity out of range: {value}")))
}
