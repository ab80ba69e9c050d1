//! Payment method label chosen at checkout.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PaymentMethod`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethodError {
    /// The input is empty (after trimming).
    #[error("payment method cannot be empty")]
    Empty,
    /// The input is too long.
    #[error("payment method must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
}

/// A free-text payment method label such as `card` or `cash`.
///
/// No payment is processed; the label is only recorded in each order's
/// status text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct PaymentMethod(String);

impl PaymentMethod {
    /// Maximum length of a payment method label, in characters.
    pub const MAX_LENGTH: usize = 32;

    /// Parse a payment method label.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or too long.
    pub fn parse(s: &str) -> Result<Self, PaymentMethodError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PaymentMethodError::Empty);
        }
        if s.chars().count() > Self::MAX_LENGTH {
            return Err(PaymentMethodError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = PaymentMethodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        method.0
    }
}
