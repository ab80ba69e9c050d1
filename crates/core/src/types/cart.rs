//! Session-scoped shopping cart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// One line of a cart: a product and how many units are requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// A mapping of product to requested quantity.
///
/// Every stored quantity is at least 1. Lines iterate in ascending
/// product-id order, which is also the order checkout processes them in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: BTreeMap<ProductId, u32>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `product_id`, returning the line's new quantity.
    pub fn add_one(&mut self, product_id: ProductId) -> u32 {
        let quantity = self.lines.entry(product_id).or_insert(0);
        *quantity = quantity.saturating_add(1);
        *quantity
    }

    /// Drop a product's line, returning the quantity it held.
    pub fn remove(&mut self, product_id: ProductId) -> Option<u32> {
        self.lines.remove(&product_id)
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Requested quantity for a product, if present.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.lines.get(&product_id).copied()
    }

    /// Iterate the cart's lines in ascending product-id order.
    pub fn lines(&self) -> impl Iterator<Item = CartLine> + '_ {
        self.lines.iter().map(|(&product_id, &quantity)| CartLine {
            product_id,
            quantity,
        })
    }

    /// Total units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.lines.values().map(|&q| u64::from(q)).sum()
    }
}

impl FromIterator<(ProductId, u32)> for Cart {
    /// Build a cart from `(product, quantity)` pairs. Zero quantities are
    /// dropped and repeated products are summed.
    fn from_iter<I: IntoIterator<Item = (ProductId, u32)>>(iter: I) -> Self {
        let mut cart = Self::new();
        for (product_id, quantity) in iter {
            if quantity == 0 {
                continue;
            }
            let line = cart.lines.entry(product_id).or_insert(0);
            *line = line.saturating_add(quantity);
        }
        cart
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_drops_only_that_line() {
        let (jar, lid) = (ProductId::generate(), ProductId::generate());
        let mut cart: Cart = [(jar, 2), (lid, 1)].into_iter().collect();

        assert_eq!(cart.remove(jar), Some(2));
        assert_eq!(cart.remove(jar), None);
        assert_eq!(cart.quantity_of(lid), Some(1));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_add_one_creates_then_increments() {
        let mut cart = Cart::new();
        let id = ProductId::generate();
        assert_eq!(cart.add_one(id), 1);
        assert_eq!(cart.add_one(id), 2);
        assert_eq!(cart.quantity_of(id), Some(2));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_lines_sorted_by_product_id() {
        let mut ids = [
            ProductId::generate(),
            ProductId::generate(),
            ProductId::generate(),
        ];
        let cart: Cart = ids.iter().rev().map(|&id| (id, 1)).collect();
        ids.sort();
        let order: Vec<_> = cart.lines().map(|line| line.product_id).collect();
        assert_eq!(order, ids.to_vec());
    }

    #[test]
    fn test_from_iter_drops_zero_and_sums() {
        let a = ProductId::generate();
        let b = ProductId::generate();
        let cart: Cart = [(a, 2), (b, 0), (a, 1)].into_iter().collect();
        assert_eq!(cart.quantity_of(a), Some(3));
        assert_eq!(cart.quantity_of(b), None);
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn test_serde_as_map() {
        let id = ProductId::new(uuid::Uuid::nil());
        let cart: Cart = [(id, 2)].into_iter().collect();
        let json = serde_json::to_value(&cart).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "00000000-0000-0000-0000-000000000000": 2 })
        );
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
