//! Catalog queries for the `PostgreSQL` store.
//!
//! Stock is kept non-negative by a `CHECK` constraint and, more importantly,
//! by the conditional `UPDATE` in [`decrement_stock`](CatalogStore::decrement_stock).

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgConnection;
use uuid::Uuid;

use pickles_core::{NewProduct, Price, Product, ProductId};

use super::{CatalogStore, PgStore, RepositoryError, quantity_from_db, quantity_to_db};

/// Raw `storefront.products` row.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    id: Uuid,
    name: String,
    price: Decimal,
    quantity: i32,
    image: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            price,
            quantity: quantity_from_db(row.quantity, "stock")?,
            image: row.image,
        })
    }
}

/// Take `amount` units from a product's stock on one connection.
///
/// Shared by the standalone decrement and the checkout transaction.
pub(super) async fn take_stock(
    conn: &mut PgConnection,
    id: ProductId,
    amount: u32,
) -> Result<u32, RepositoryError> {
    let amount_db = quantity_to_db(amount)?;

    let remaining: Option<i32> = sqlx::query_scalar(
        r"
        UPDATE storefront.products
        SET quantity = quantity - $2
        WHERE id = $1 AND quantity >= $2
        RETURNING quantity
        ",
    )
    .bind(id)
    .bind(amount_db)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(remaining) = remaining {
        return quantity_from_db(remaining, "stock");
    }

    // The guard rejected the update: tell a missing product apart from a short one.
    let available: Option<i32> =
        sqlx::query_scalar("SELECT quantity FROM storefront.products WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    match available {
        None => Err(RepositoryError::UnknownProduct(id)),
        Some(available) => Err(RepositoryError::InsufficientStock {
            product_id: id,
            requested: amount,
            available: quantity_from_db(available, "stock")?,
        }),
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            SELECT id, name, price, quantity, image
            FROM storefront.products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r"
            SELECT id, name, price, quantity, image
            FROM storefront.products
            ORDER BY name, id
            ",
        )
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let product = product.into_product();

        sqlx::query(
            r"
            INSERT INTO storefront.products (id, name, price, quantity, image)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price.amount())
        .bind(quantity_to_db(product.quantity)?)
        .bind(&product.image)
        .execute(self.pool())
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict(format!("product {} already exists", product.id));
            }
            RepositoryError::Database(e)
        })?;

        Ok(product)
    }

    async fn decrement_stock(&self, id: ProductId, amount: u32) -> Result<u32, RepositoryError> {
        let mut conn = self.pool().acquire().await?;
        take_stock(&mut conn, id, amount).await
    }

    async fn restock(&self, id: ProductId, amount: u32) -> Result<u32, RepositoryError> {
        let limit = RepositoryError::StockLimit {
            product_id: id,
            amount,
        };
        let Ok(amount) = i32::try_from(amount) else {
            return Err(limit);
        };

        let quantity: Option<i32> = sqlx::query_scalar(
            r"
            UPDATE storefront.products
            SET quantity = quantity + $2
            WHERE id = $1 AND quantity <= 2147483647 - $2
            RETURNING quantity
            ",
        )
        .bind(id)
        .bind(amount)
        .fetch_optional(self.pool())
        .await?;

        if let Some(quantity) = quantity {
            return quantity_from_db(quantity, "stock");
        }

        // Nothing updated: either the product is gone or it is at the limit.
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM storefront.products WHERE id = $1)",
        )
        .bind(id)
        .fetch_one(self.pool())
        .await?;

        if exists {
            Err(limit)
        } else {
            Err(RepositoryError::UnknownProduct(id))
        }
    }
}
