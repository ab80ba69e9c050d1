//! Type-safe price representation using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when creating a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,

    /// The amount has more than two decimal places.
    #[error("price cannot have more than {} decimal places", Price::SCALE)]
    TooPrecise,

    /// The amount exceeds [`Price::MAX`].
    #[error("price cannot exceed {}", Price::MAX)]
    TooLarge,
}

/// A non-negative unit price in the shop's single currency.
///
/// Bounded to what a `NUMERIC(12,2)` column holds: at most two decimal
/// places and no more than [`Price::MAX`].
///
/// Serialized as a decimal string (`"3.00"`) so no precision is lost in
/// JSON responses or the session store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Largest accepted price, 9,999,999,999.99.
    pub const MAX: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

    /// Decimal places a price may carry.
    pub const SCALE: u32 = 2;

    /// Create a new price.
    ///
    /// Trailing zeros do not count against the scale, so `3.500` is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if `amount` is below zero,
    /// [`PriceError::TooPrecise`] if it has sub-cent digits and
    /// [`PriceError::TooLarge`] if it exceeds [`Price::MAX`].
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount.normalize().scale() > Self::SCALE {
            return Err(PriceError::TooPrecise);
        }
        if amount > Self::MAX {
            return Err(PriceError::TooLarge);
        }
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    ///
    /// # Errors
    ///
    /// Same as [`Price::new`].
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units, or `None` if the product overflows.
    #[must_use]
    pub fn times(&self, quantity: u32) -> Option<Decimal> {
        self.0.checked_mul(Decimal::from(quantity))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_rejected() {
        assert_eq!(Price::from_cents(-1), Err(PriceError::Negative));
        assert!(Price::new(Decimal::ZERO).is_ok());
    }

    #[test]
    fn test_times() {
        let price = Price::from_cents(300).unwrap();
        assert_eq!(price.times(2), Some(Decimal::new(600, 2)));
        assert_eq!(price.times(0), Some(Decimal::ZERO));

        let top = Price::new(Price::MAX).unwrap();
        assert_eq!(
            top.times(u32::MAX),
            Some(Price::MAX * Decimal::from(u32::MAX))
        );
    }

    #[test]
    fn test_max_is_ten_digits_and_cents() {
        assert_eq!(Price::MAX, Decimal::new(999_999_999_999, 2));
        assert_eq!(Price::MAX.to_string(), "9999999999.99");
    }

    #[test]
    fn test_sub_cent_amounts_rejected() {
        assert_eq!(Price::new(Decimal::new(1005, 3)), Err(PriceError::TooPrecise));
        assert_eq!(Price::new(Decimal::new(1, 28)), Err(PriceError::TooPrecise));
        assert!(Price::new(Decimal::new(3500, 3)).is_ok());
    }

    #[test]
    fn test_amounts_past_column_range_rejected() {
        assert_eq!(Price::new(Decimal::MAX), Err(PriceError::TooLarge));
        assert_eq!(
            Price::new(Price::MAX + Decimal::new(1, 2)),
            Err(PriceError::TooLarge)
        );
        assert!(Price::new(Price::MAX).is_ok());
        assert!(serde_json::from_str::<Price>("\"79228162514264337593543950335\"").is_err());
    }

    #[test]
    fn test_display_two_places() {
        assert_eq!(Price::from_cents(500).unwrap().to_string(), "5.00");
        assert_eq!(Price::new(Decimal::new(35, 1)).unwrap().to_string(), "3.50");
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Price::from_cents(1999).unwrap()).unwrap();
        assert_eq!(json, "\"19.99\"");
        assert!(serde_json::from_str::<Price>("\"-1.00\"").is_err());
    }
}
