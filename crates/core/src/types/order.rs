//! Order records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{OrderId, ProductId};
use super::status::OrderStatus;
use super::username::Username;

/// Errors that can occur when creating an [`Order`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// An order line must request at least one unit.
    #[error("order quantity must be at least 1")]
    ZeroQuantity,
}

/// One product line of a completed checkout.
///
/// Orders are append-only: written once by the checkout ledger and never
/// updated or deleted. `user_id` and `product_id` are soft references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Username,
    pub product_id: ProductId,
    pub quantity: u32,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order with a freshly generated ID.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::ZeroQuantity`] if `quantity` is zero.
    pub fn place(
        user_id: Username,
        product_id: ProductId,
        quantity: u32,
        status: OrderStatus,
        created_at: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        if quantity == 0 {
            return Err(OrderError::ZeroQuantity);
        }
        Ok(Self {
            id: OrderId::generate(),
            user_id,
            product_id,
            quantity,
            status,
            created_at,
        })
    }
}
