//! Admin-side catalog management and reporting.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};

use pickles_core::{
    MAX_STOCK, NewProduct, OrderId, Price, PriceError, Product, ProductError, ProductId,
    Username,
};

use crate::db::{RepositoryError, ShopStore};

/// Placeholder shown for an order's user or product that no longer resolves.
pub const MISSING_REFERENCE: &str = "?";

/// Errors that can occur during catalog management.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Product fields failed validation.
    #[error("invalid product: {0}")]
    InvalidProduct(#[from] ProductError),

    /// Price failed validation.
    #[error("invalid price: {0}")]
    InvalidPrice(#[from] PriceError),

    /// Restock amounts must be positive.
    #[error("restock amount must be at least 1")]
    ZeroRestock,

    /// The product does not exist.
    #[error("product {0} does not exist")]
    UnknownProduct(ProductId),

    /// The restock would take the product past [`MAX_STOCK`].
    #[error("stock cannot exceed {MAX_STOCK} units")]
    StockLimit(ProductId),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for CatalogError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UnknownProduct(id) => Self::UnknownProduct(id),
            RepositoryError::StockLimit { product_id, .. } => Self::StockLimit(product_id),
            other => Self::Repository(other),
        }
    }
}

/// Counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub product_count: usize,
    pub order_count: usize,
    pub units_in_stock: u64,
    pub out_of_stock: usize,
}

/// One row of the admin orders report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderReportLine {
    pub order_id: OrderId,
    pub username: String,
    pub product_name: String,
    pub quantity: u32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Catalog management service.
pub struct CatalogService<'a> {
    store: &'a dyn ShopStore,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(store: &'a dyn ShopStore) -> Self {
        Self { store }
    }

    /// Add a product to the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidProduct`/`InvalidPrice` for bad input,
    /// or `CatalogError::Repository` if the insert fails.
    #[instrument(skip(self))]
    pub async fn add_product(
        &self,
        name: &str,
        price: Decimal,
        quantity: u32,
        image: Option<&str>,
    ) -> Result<Product, CatalogError> {
        let product = NewProduct::new(name, Price::new(price)?, quantity, image)?;
        let product = self.store.insert_product(product).await?;
        info!(product_id = %product.id, name = %product.name, "Product added");
        Ok(product)
    }

    /// Add units to a product's stock, returning the new quantity.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ZeroRestock` for a zero amount,
    /// `CatalogError::StockLimit` if the result would exceed [`MAX_STOCK`] and
    /// `CatalogError::UnknownProduct` if the product does not exist.
    #[instrument(skip(self))]
    pub async fn restock(&self, id: ProductId, amount: u32) -> Result<u32, CatalogError> {
        if amount == 0 {
            return Err(CatalogError::ZeroRestock);
        }
        if amount > MAX_STOCK {
            return Err(CatalogError::StockLimit(id));
        }
        let quantity = self.store.restock(id, amount).await?;
        info!(product_id = %id, amount, quantity, "Product restocked");
        Ok(quantity)
    }

    /// Every product, for the stock view.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the catalog cannot be read.
    pub async fn stock(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.store.list_products().await?)
    }

    /// Summary counts for the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if a store cannot be read.
    pub async fn dashboard(&self) -> Result<DashboardStats, CatalogError> {
        let products = self.store.list_products().await?;
        let orders = self.store.list_orders().await?;

        Ok(DashboardStats {
            product_count: products.len(),
            order_count: orders.len(),
            units_in_stock: products.iter().map(|p| u64::from(p.quantity)).sum(),
            out_of_stock: products.iter().filter(|p| p.quantity == 0).count(),
        })
    }

    /// Every order joined with its user and product, newest first.
    ///
    /// References that no longer resolve show as [`MISSING_REFERENCE`].
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if a store cannot be read.
    pub async fn orders_report(&self) -> Result<Vec<OrderReportLine>, CatalogError> {
        let orders = self.store.list_orders().await?;
        let products: HashMap<ProductId, String> = self
            .store
            .list_products()
            .await?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();

        let mut known_users: HashMap<Username, bool> = HashMap::new();
        let mut report = Vec::with_capacity(orders.len());

        for order in orders {
            let exists = match known_users.get(&order.user_id) {
                Some(&exists) => exists,
                None => {
                    let exists = self.store.get_user(&order.user_id).await?.is_some();
                    known_users.insert(order.user_id.clone(), exists);
                    exists
                }
            };

            report.push(OrderReportLine {
                order_id: order.id,
                username: if exists {
                    order.user_id.into_inner()
                } else {
                    MISSING_REFERENCE.to_string()
                },
                product_name: products
                    .get(&order.product_id)
                    .cloned()
                    .unwrap_or_else(|| MISSING_REFERENCE.to_string()),
                quantity: order.quantity,
                status: order.status.to_string(),
                created_at: order.created_at,
            });
        }

        Ok(report)
    }
}
