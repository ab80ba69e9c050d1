//! Cart operations.
//!
//! The cart itself lives in the session; this service resolves it against
//! the catalog for display and guards additions.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, instrument};

use pickles_core::{Cart, Price, ProductId};

use crate::db::{RepositoryError, ShopStore};
use crate::models::ShopSession;

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product being added does not exist.
    #[error("product {0} does not exist")]
    UnknownProduct(ProductId),

    /// A line or the cart total does not fit in a decimal.
    #[error("cart total is too large")]
    TotalTooLarge,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Session store error.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// One displayable cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartViewLine {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub price: Price,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::str")]
    pub line_total: Decimal,
}

/// The cart resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub items: Vec<CartViewLine>,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
}

/// Cart service.
pub struct CartService<'a> {
    catalog: &'a dyn ShopStore,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(catalog: &'a dyn ShopStore) -> Self {
        Self { catalog }
    }

    /// Add one unit of a product to the session's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::UnknownProduct` if the product is not in the catalog,
    /// or a repository/session error if either store fails.
    #[instrument(skip(self, session))]
    pub async fn add_one(
        &self,
        session: &ShopSession,
        product_id: ProductId,
    ) -> Result<Cart, CartError> {
        if self.catalog.get_product(product_id).await?.is_none() {
            return Err(CartError::UnknownProduct(product_id));
        }

        let mut cart = session.cart().await?;
        let quantity = cart.add_one(product_id);
        session.save_cart(&cart).await?;

        debug!(%product_id, quantity, "Added to cart");
        Ok(cart)
    }

    /// Resolve a cart for display.
    ///
    /// Lines whose product no longer exists are skipped; the total covers
    /// only the lines that remain.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the catalog cannot be read, or
    /// `CartError::TotalTooLarge` if the amounts overflow.
    pub async fn view(&self, cart: &Cart) -> Result<CartView, CartError> {
        let mut items = Vec::with_capacity(cart.len());
        let mut total = Decimal::ZERO;

        for line in cart.lines() {
            let Some(product) = self.catalog.get_product(line.product_id).await? else {
                debug!(product_id = %line.product_id, "Skipping cart line for missing product");
                continue;
            };

            let line_total = product
                .price
                .times(line.quantity)
                .ok_or(CartError::TotalTooLarge)?;
            total = total
                .checked_add(line_total)
                .ok_or(CartError::TotalTooLarge)?;
            items.push(CartViewLine {
                product_id: product.id,
                name: product.name,
                image: product.image,
                price: product.price,
                quantity: line.quantity,
                line_total,
            });
        }

        Ok(CartView { items, total })
    }
}
