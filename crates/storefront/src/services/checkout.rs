//! Checkout workflow.
//!
//! Turns the session's cart into orders:
//!
//! 1. Reject an empty cart before touching any store.
//! 2. Build one [`Order`] per cart line, in ascending product-id order.
//! 3. Commit every stock decrement and order write through the
//!    [`CheckoutLedger`] as one all-or-nothing unit.
//! 4. Resolve product names (placeholder `Unknown` for vanished products)
//!    and publish one summary notification. Publishing is best effort.
//! 5. Clear the cart.
//!
//! A failed commit leaves stock and orders exactly as they were. The cart is
//! kept too, except that a line for a product which no longer exists is
//! dropped so the next attempt can go through.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use pickles_core::{Order, OrderError, OrderStatus, PaymentMethod, ProductId, Username};

use crate::db::{RepositoryError, ShopStore};
use crate::models::ShopSession;
use crate::services::notify::Notifier;

/// Display name used when an ordered product can no longer be found.
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown";

/// Errors that can abort a checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to check out.
    #[error("cart is empty")]
    EmptyCart,

    /// A line asks for more units than are in stock.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// A line refers to a product that no longer exists. The line has been
    /// removed from the cart.
    #[error("product {0} is no longer available")]
    ProductUnavailable(ProductId),

    /// An order could not be constructed from a cart line.
    #[error("invalid order line: {0}")]
    InvalidLine(#[from] OrderError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),

    /// Session store error while reading the cart.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl From<RepositoryError> for CheckoutError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::InsufficientStock {
                product_id,
                requested,
                available,
            } => Self::InsufficientStock {
                product_id,
                requested,
                available,
            },
            RepositoryError::UnknownProduct(id) => Self::ProductUnavailable(id),
            other => Self::Repository(other),
        }
    }
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    /// One order per cart line.
    pub orders: Vec<Order>,
    /// The notification text that was (or would have been) published.
    pub summary: String,
    /// Whether the notification channel accepted the summary.
    pub notification_sent: bool,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    store: &'a dyn ShopStore,
    notifier: &'a dyn Notifier,
    subject: &'a str,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service publishing under `subject`.
    #[must_use]
    pub const fn new(
        store: &'a dyn ShopStore,
        notifier: &'a dyn Notifier,
        subject: &'a str,
    ) -> Self {
        Self {
            store,
            notifier,
            subject,
        }
    }

    /// Check out the session's cart for `user`.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::EmptyCart` if there is nothing to buy (no writes happen)
    /// - `CheckoutError::InsufficientStock` / `ProductUnavailable` if any line
    ///   cannot be satisfied (no orders or stock changes; a vanished product's
    ///   line is dropped from the cart)
    /// - `CheckoutError::Repository` / `Session` if a store fails before commit
    ///
    /// Notification and cart-clearing failures after the commit are logged
    /// and do not fail the checkout.
    #[instrument(skip(self, session), fields(payment_method = %payment_method))]
    pub async fn checkout(
        &self,
        session: &ShopSession,
        user: &Username,
        payment_method: &PaymentMethod,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        let mut cart = session.cart().await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let status = OrderStatus::confirmed(payment_method);
        let placed_at = Utc::now();
        let orders = cart
            .lines()
            .map(|line| {
                Order::place(
                    user.clone(),
                    line.product_id,
                    line.quantity,
                    status.clone(),
                    placed_at,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        if let Err(e) = self.store.commit_checkout(&orders).await {
            warn!(error = %e, "Checkout aborted; no orders written");
            let err = CheckoutError::from(e);
            if let CheckoutError::ProductUnavailable(product_id) = err {
                cart.remove(product_id);
                match session.save_cart(&cart).await {
                    Ok(()) => info!(%product_id, "Dropped vanished product from cart"),
                    Err(e) => {
                        error!(%product_id, error = %e, "Failed to drop vanished product from cart");
                    }
                }
            }
            return Err(err);
        }

        info!(order_count = orders.len(), "Checkout committed");

        let mut lines = Vec::with_capacity(orders.len());
        for order in &orders {
            let name = self.product_name(order.product_id).await;
            lines.push((name, order.quantity));
        }
        let summary = order_summary(user, &lines);

        let notification_sent = match self.notifier.publish(self.subject, &summary).await {
            Ok(()) => true,
            Err(e) => {
                let event_id = sentry::capture_error(&e);
                warn!(
                    error = %e,
                    sentry_event_id = %event_id,
                    "Order notification failed; checkout still succeeded"
                );
                false
            }
        };

        if let Err(e) = session.clear_cart().await {
            error!(error = %e, "Failed to clear cart after committed checkout");
        }

        Ok(CheckoutReceipt {
            orders,
            summary,
            notification_sent,
        })
    }

    /// Current display name of a product, or the placeholder if it is gone.
    async fn product_name(&self, id: ProductId) -> String {
        match self.store.get_product(id).await {
            Ok(Some(product)) => product.name,
            Ok(None) => UNKNOWN_PRODUCT_NAME.to_string(),
            Err(e) => {
                warn!(product_id = %id, error = %e, "Could not resolve product name");
                UNKNOWN_PRODUCT_NAME.to_string()
            }
        }
    }
}

/// Build the notification text: a header naming the user, then one
/// `<name> x <qty>` line per item.
#[must_use]
pub fn order_summary(user: &Username, lines: &[(String, u32)]) -> String {
    std::iter::once(format!("New order placed by {user}:"))
        .chain(lines.iter().map(|(name, quantity)| format!("{name} x {quantity}")))
        .collect::<Vec<_>>()
        .join("\n")
}
