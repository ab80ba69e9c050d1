//! In-memory implementation of the storage ports.
//!
//! Every collection lives behind one async mutex, so each operation
//! (including a whole checkout commit) is atomic with respect to every other.
//! [`MemoryStore::set_unavailable`] makes every call fail, which lets tests
//! exercise store outages.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use pickles_core::{MAX_STOCK, NewProduct, Order, OrderId, Product, ProductId, User, Username};

use super::{CatalogStore, CheckoutLedger, IdentityStore, OrderStore, RepositoryError, ShopStore};

#[derive(Debug, Default)]
struct Tables {
    products: HashMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    users: HashMap<Username, User>,
}

/// Store keeping all data in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store becoming unreachable (or recovering).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Insert or replace a product with a known ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` while the store is marked unavailable.
    pub async fn upsert_product(&self, product: Product) -> Result<(), RepositoryError> {
        self.check_available()?;
        self.tables.lock().await.products.insert(product.id, product);
        Ok(())
    }

    /// Remove a product, as if it had been deleted out from under a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Unavailable` while the store is marked unavailable.
    pub async fn remove_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.check_available()?;
        Ok(self.tables.lock().await.products.remove(&id))
    }

    /// Number of orders written so far.
    pub async fn order_count(&self) -> usize {
        self.tables.lock().await.orders.len()
    }

    fn check_available(&self) -> Result<(), RepositoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RepositoryError::Unavailable(
                "memory store marked unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

impl Tables {
    /// Validate that a decrement can be applied, without applying it.
    fn check_stock(&self, id: ProductId, amount: u32) -> Result<u32, RepositoryError> {
        let product = self
            .products
            .get(&id)
            .ok_or(RepositoryError::UnknownProduct(id))?;

        product
            .quantity
            .checked_sub(amount)
            .ok_or(RepositoryError::InsufficientStock {
                product_id: id,
                requested: amount,
                available: product.quantity,
            })
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.check_available()?;
        Ok(self.tables.lock().await.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.check_available()?;
        let mut products: Vec<Product> =
            self.tables.lock().await.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        self.check_available()?;
        let product = product.into_product();
        let mut tables = self.tables.lock().await;
        if tables.products.contains_key(&product.id) {
            return Err(RepositoryError::Conflict(format!(
                "product {} already exists",
                product.id
            )));
        }
        tables.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn decrement_stock(&self, id: ProductId, amount: u32) -> Result<u32, RepositoryError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        let remaining = tables.check_stock(id, amount)?;
        if let Some(product) = tables.products.get_mut(&id) {
            product.quantity = remaining;
        }
        Ok(remaining)
    }

    async fn restock(&self, id: ProductId, amount: u32) -> Result<u32, RepositoryError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        let product = tables
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::UnknownProduct(id))?;
        product.quantity = product
            .quantity
            .checked_add(amount)
            .filter(|&quantity| quantity <= MAX_STOCK)
            .ok_or(RepositoryError::StockLimit {
                product_id: id,
                amount,
            })?;
        Ok(product.quantity)
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn put_order(&self, order: &Order) -> Result<(), RepositoryError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        if tables.orders.contains_key(&order.id) {
            return Err(RepositoryError::Conflict(format!(
                "order {} already exists",
                order.id
            )));
        }
        tables.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        self.check_available()?;
        let mut orders: Vec<Order> = self.tables.lock().await.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(orders)
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn get_user(&self, username: &Username) -> Result<Option<User>, RepositoryError> {
        self.check_available()?;
        Ok(self.tables.lock().await.users.get(username).cloned())
    }

    async fn insert_user_if_absent(&self, user: &User) -> Result<(), RepositoryError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;
        if tables.users.contains_key(&user.username) {
            return Err(RepositoryError::Conflict(format!(
                "username {} already taken",
                user.username
            )));
        }
        tables.users.insert(user.username.clone(), user.clone());
        Ok(())
    }
}

#[async_trait]
impl CheckoutLedger for MemoryStore {
    async fn commit_checkout(&self, orders: &[Order]) -> Result<(), RepositoryError> {
        self.check_available()?;
        let mut tables = self.tables.lock().await;

        // Validate every line against running totals before touching anything.
        let mut requested: BTreeMap<ProductId, u32> = BTreeMap::new();
        for order in orders {
            if tables.orders.contains_key(&order.id) {
                return Err(RepositoryError::Conflict(format!(
                    "order {} already exists",
                    order.id
                )));
            }
            let total = requested.entry(order.product_id).or_insert(0);
            let wanted = total.checked_add(order.quantity).ok_or_else(|| {
                RepositoryError::DataCorruption("requested quantity overflow".to_string())
            })?;
            tables
                .check_stock(order.product_id, wanted)
                .map_err(|e| match e {
                    RepositoryError::InsufficientStock {
                        product_id,
                        available,
                        ..
                    } => RepositoryError::InsufficientStock {
                        product_id,
                        requested: order.quantity,
                        available: available.saturating_sub(*total),
                    },
                    other => other,
                })?;
            *total = wanted;
        }

        for (id, amount) in requested {
            if let Some(product) = tables.products.get_mut(&id) {
                product.quantity -= amount;
            }
        }
        for order in orders {
            tables.orders.insert(order.id, order.clone());
        }

        Ok(())
    }
}

#[async_trait]
impl ShopStore for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check_available()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use pickles_core::{OrderStatus, Password, PaymentMethod, Price};

    use super::*;

    async fn seed(store: &MemoryStore, name: &str, quantity: u32) -> Product {
        let product = NewProduct::new(name, Price::from_cents(300).unwrap(), quantity, None).unwrap();
        store.insert_product(product).await.unwrap()
    }

    fn order(product_id: ProductId, quantity: u32) -> Order {
        let status = OrderStatus::confirmed(&PaymentMethod::parse("card").unwrap());
        Order::place(
            Username::parse("alice").unwrap(),
            product_id,
            quantity,
            status,
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_restock_stops_at_stock_limit() {
        let store = MemoryStore::new();
        let jar = seed(&store, "Jar", MAX_STOCK - 1).await;

        assert_eq!(store.restock(jar.id, 1).await.unwrap(), MAX_STOCK);
        let err = store.restock(jar.id, 1).await.unwrap_err();
        assert!(matches!(err, RepositoryError::StockLimit { amount: 1, .. }));
        let err = store.restock(jar.id, u32::MAX).await.unwrap_err();
        assert!(matches!(err, RepositoryError::StockLimit { .. }));
        assert_eq!(
            store.get_product(jar.id).await.unwrap().unwrap().quantity,
            MAX_STOCK
        );
    }

    #[tokio::test]
    async fn test_decrement_never_goes_negative() {
        let store = MemoryStore::new();
        let jar = seed(&store, "Jar", 2).await;

        assert_eq!(store.decrement_stock(jar.id, 2).await.unwrap(), 0);
        let err = store.decrement_stock(jar.id, 1).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::InsufficientStock {
                requested: 1,
                available: 0,
                ..
            }
        ));
        assert_eq!(store.get_product(jar.id).await.unwrap().unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_decrement_unknown_product() {
        let store = MemoryStore::new();
        let err = store
            .decrement_stock(ProductId::generate(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UnknownProduct(_)));
    }

    #[tokio::test]
    async fn test_concurrent_decrements_respect_stock() {
        let store = Arc::new(MemoryStore::new());
        let jar = seed(&store, "Jar", 3).await;

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.decrement_stock(jar.id, 2).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.get_product(jar.id).await.unwrap().unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn test_commit_checkout_is_all_or_nothing() {
        let store = MemoryStore::new();
        let jar = seed(&store, "Jar", 5).await;
        let lid = seed(&store, "Lid", 0).await;

        let err = store
            .commit_checkout(&[order(jar.id, 2), order(lid.id, 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::InsufficientStock { product_id, .. } if product_id == lid.id));
        assert_eq!(store.get_product(jar.id).await.unwrap().unwrap().quantity, 5);
        assert_eq!(store.order_count().await, 0);
    }

    #[tokio::test]
    async fn test_commit_checkout_applies_every_line() {
        let store = MemoryStore::new();
        let jar = seed(&store, "Jar", 5).await;
        let lid = seed(&store, "Lid", 1).await;

        store
            .commit_checkout(&[order(jar.id, 2), order(lid.id, 1)])
            .await
            .unwrap();

        assert_eq!(store.get_product(jar.id).await.unwrap().unwrap().quantity, 3);
        assert_eq!(store.get_product(lid.id).await.unwrap().unwrap().quantity, 0);
        assert_eq!(store.list_orders().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_commit_checkout_counts_repeated_products() {
        let store = MemoryStore::new();
        let jar = seed(&store, "Jar", 3).await;

        let err = store
            .commit_checkout(&[order(jar.id, 2), order(jar.id, 2)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::InsufficientStock {
                requested: 2,
                available: 1,
                ..
            }
        ));
        assert_eq!(store.get_product(jar.id).await.unwrap().unwrap().quantity, 3);
    }

    #[tokio::test]
    async fn test_insert_user_if_absent() {
        let store = MemoryStore::new();
        let user = User::shopper(
            Username::parse("alice").unwrap(),
            Password::new("brine").unwrap(),
        );

        store.insert_user_if_absent(&user).await.unwrap();
        let err = store.insert_user_if_absent(&user).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.list_products().await,
            Err(RepositoryError::Unavailable(_))
        ));
        assert!(store.ping().await.is_err());

        store.set_unavailable(false);
        assert!(store.ping().await.is_ok());
    }
}
