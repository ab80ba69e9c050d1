//! Transactional checkout commit for the `PostgreSQL` store.

use async_trait::async_trait;

use pickles_core::Order;

use super::orders::insert_order;
use super::products::take_stock;
use super::{CheckoutLedger, PgStore, RepositoryError};

#[async_trait]
impl CheckoutLedger for PgStore {
    async fn commit_checkout(&self, orders: &[Order]) -> Result<(), RepositoryError> {
        let mut tx = self.pool().begin().await?;

        for order in orders {
            // Returning early drops `tx`, which rolls back every earlier line.
            take_stock(&mut tx, order.product_id, order.quantity).await?;
            insert_order(&mut tx, order).await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use pickles_core::{NewProduct, OrderStatus, PaymentMethod, Price, ProductId, Username};

    use super::*;
    use crate::db::{CatalogStore, OrderStore, migrated_test_store};

    async fn seed(store: &PgStore, quantity: u32) -> ProductId {
        let name = format!("Jar {}", ProductId::generate());
        let product =
            NewProduct::new(&name, Price::from_cents(300).unwrap(), quantity, None).unwrap();
        store.insert_product(product).await.unwrap().id
    }

    async fn stock(store: &PgStore, id: ProductId) -> u32 {
        store.get_product(id).await.unwrap().unwrap().quantity
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

    async fn has_orders_for(store: &PgStore, ids: &[ProductId]) -> bool {
        store
            .list_orders()
            .await
            .unwrap()
            .iter()
            .any(|o| ids.contains(&o.product_id))
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (STOREFRONT_DATABASE_URL)"]
    async fn test_commit_checkout_writes_every_line() {
        let store = migrated_test_store().await;
        let jar = seed(&store, 5).await;
        let lid = seed(&store, 1).await;

        store
            .commit_checkout(&[order(jar, 2), order(lid, 1)])
            .await
            .unwrap();

        assert_eq!(stock(&store, jar).await, 3);
        assert_eq!(stock(&store, lid).await, 0);
        assert!(has_orders_for(&store, &[jar]).await);
        assert!(has_orders_for(&store, &[lid]).await);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (STOREFRONT_DATABASE_URL)"]
    async fn test_commit_checkout_rolls_back_earlier_lines() {
        let store = migrated_test_store().await;
        let jar = seed(&store, 5).await;
        let lid = seed(&store, 1).await;

        let err = store
            .commit_checkout(&[order(jar, 2), order(lid, 3)])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RepositoryError::InsufficientStock {
                requested: 3,
                available: 1,
                ..
            }
        ));
        assert_eq!(stock(&store, jar).await, 5);
        assert_eq!(stock(&store, lid).await, 1);
        assert!(!has_orders_for(&store, &[jar, lid]).await);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (STOREFRONT_DATABASE_URL)"]
    async fn test_commit_checkout_rolls_back_on_missing_product() {
        let store = migrated_test_store().await;
        let jar = seed(&store, 5).await;
        let gone = ProductId::generate();

        let err = store
            .commit_checkout(&[order(jar, 1), order(gone, 1)])
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::UnknownProduct(id) if id == gone));
        assert_eq!(stock(&store, jar).await, 5);
        assert!(!has_orders_for(&store, &[jar, gone]).await);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL (STOREFRONT_DATABASE_URL)"]
    async fn test_concurrent_commits_never_oversell() {
        let store = migrated_test_store().await;
        let jar = seed(&store, 3).await;

        let first = [order(jar, 2)];
        let second = [order(jar, 2)];
        let (a, b) = tokio::join!(
            store.commit_checkout(&first),
            store.commit_checkout(&second),
        );

        assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
        assert_eq!(stock(&store, jar).await, 1);
    }
}
