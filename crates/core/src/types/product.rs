//! Catalog product records.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Image reference used when a product is created without one.
pub const DEFAULT_PRODUCT_IMAGE: &str = "/static/images/default.jpg";

/// Most units a product can hold, the range of the stock column.
pub const MAX_STOCK: u32 = i32::MAX.unsigned_abs();

/// Errors that can occur when creating a product.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProductError {
    /// The product name is empty (after trimming).
    #[error("product name cannot be empty")]
    EmptyName,
    /// The product name is too long.
    #[error("product name must be at most {max} characters")]
    NameTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The initial stock is above [`MAX_STOCK`].
    #[error("stock cannot exceed {max} units")]
    TooMuchStock {
        /// Maximum allowed quantity.
        max: u32,
    },
}

/// A product in the catalog.
///
/// `quantity` is the units in stock. It only changes through checkout
/// (decrement) and admin restock, and the store never lets it go below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub quantity: u32,
    pub image: String,
}

impl Product {
    /// Whether `requested` units can be taken from stock.
    #[must_use]
    pub const fn has_stock(&self, requested: u32) -> bool {
        self.quantity >= requested
    }
}

/// Validated input for a new catalog product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    name: String,
    price: Price,
    quantity: u32,
    image: String,
}

impl NewProduct {
    /// Maximum length of a product name, in characters.
    pub const MAX_NAME_LENGTH: usize = 200;

    /// Validate a new product. A blank image falls back to
    /// [`DEFAULT_PRODUCT_IMAGE`].
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed name is empty or too long, or if
    /// `quantity` is above [`MAX_STOCK`].
    pub fn new(
        name: &str,
        price: Price,
        quantity: u32,
        image: Option<&str>,
    ) -> Result<Self, ProductError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProductError::EmptyName);
        }
        if name.chars().count() > Self::MAX_NAME_LENGTH {
            return Err(ProductError::NameTooLong {
                max: Self::MAX_NAME_LENGTH,
            });
        }
        if quantity > MAX_STOCK {
            return Err(ProductError::TooMuchStock { max: MAX_STOCK });
        }

        let image = image
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_PRODUCT_IMAGE);

        Ok(Self {
            name: name.to_owned(),
            price,
            quantity,
            image: image.to_owned(),
        })
    }

    /// Assign a fresh ID and turn this into a catalog [`Product`].
    #[must_use]
    pub fn into_product(self) -> Product {
        Product {
            id: ProductId::generate(),
            name: self.name,
            price: self.price,
            quantity: self.quantity,
            image: self.image,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_image_uses_default() {
        let price = Price::from_cents(300).unwrap();
        let product = NewProduct::new("Jar", price, 5, Some("  "))
            .unwrap()
            .into_product();
        assert_eq!(product.image, DEFAULT_PRODUCT_IMAGE);

        let product = NewProduct::new("Jar", price, 5, None).unwrap().into_product();
        assert_eq!(product.image, DEFAULT_PRODUCT_IMAGE);
    }

    #[test]
    fn test_name_validation() {
        let price = Price::ZERO;
        assert_eq!(
            NewProduct::new("   ", price, 1, None),
            Err(ProductError::EmptyName)
        );
        assert!(matches!(
            NewProduct::new(&"n".repeat(201), price, 1, None),
            Err(ProductError::NameTooLong { .. })
        ));
    }

    #[test]
    fn test_stock_limited_to_column_range() {
        assert_eq!(MAX_STOCK, 2_147_483_647);
        assert!(NewProduct::new("Brine", Price::ZERO, MAX_STOCK, None).is_ok());
        assert_eq!(
            NewProduct::new("Brine", Price::ZERO, MAX_STOCK + 1, None),
            Err(ProductError::TooMuchStock { max: MAX_STOCK })
        );
    }

    #[test]
    fn test_has_stock() {
        let product = NewProduct::new("Lid", Price::ZERO, 1, Some("/static/lid.jpg"))
            .unwrap()
            .into_product();
        assert!(product.has_stock(1));
        assert!(!product.has_stock(2));
        assert_eq!(product.image, "/static/lid.jpg");
    }
}
