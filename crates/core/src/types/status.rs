//! Order status text.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::payment::PaymentMethod;

/// Free-text status recorded on an order.
///
/// Orders are immutable once written, so the status is a snapshot taken at
/// checkout. It encodes both the confirmation state and the payment method,
/// e.g. `Confirmed (card)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderStatus(String);

impl OrderStatus {
    /// Status for an order confirmed with the given payment method.
    #[must_use]
    pub fn confirmed(method: &PaymentMethod) -> Self {
        Self(format!("Confirmed ({method})"))
    }

    /// Wrap a status read back from storage.
    #[must_use]
    pub fn from_stored(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the status text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmed_encodes_payment_method() {
        let method = PaymentMethod::parse("card").unwrap();
        assert_eq!(OrderStatus::confirmed(&method).as_str(), "Confirmed (card)");
    }
}
