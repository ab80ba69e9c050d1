//! Order queries for the `PostgreSQL` store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use pickles_core::{Order, OrderId, OrderStatus, ProductId, Username};

use super::{OrderStore, PgStore, RepositoryError, quantity_from_db, quantity_to_db};

/// Raw `storefront.orders` row.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: String,
    product_id: Uuid,
    quantity: i32,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let user_id = Username::parse(&row.user_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid user on order {}: {e}", row.id))
        })?;
        let quantity = quantity_from_db(row.quantity, "order quantity")?;
        if quantity == 0 {
            return Err(RepositoryError::DataCorruption(format!(
                "order {} has zero quantity",
                row.id
            )));
        }

        Ok(Self {
            id: OrderId::new(row.id),
            user_id,
            product_id: ProductId::new(row.product_id),
            quantity,
            status: OrderStatus::from_stored(row.status),
            created_at: row.created_at,
        })
    }
}

/// Insert one order on the given connection.
pub(super) async fn insert_order(
    conn: &mut PgConnection,
    order: &Order,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r"
        INSERT INTO storefront.orders (id, user_id, product_id, quantity, status, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ",
    )
    .bind(order.id)
    .bind(order.user_id.as_str())
    .bind(order.product_id)
    .bind(quantity_to_db(order.quantity)?)
    .bind(order.status.as_str())
    .bind(order.created_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return RepositoryError::Conflict(format!("order {} already exists", order.id));
        }
        RepositoryError::Database(e)
    })?;

    Ok(())
}

#[async_trait]
impl OrderStore for PgStore {
    async fn put_order(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut conn = self.pool().acquire().await?;
        insert_order(&mut conn, order).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(
            r"
            SELECT id, user_id, product_id, quantity, status, created_at
            FROM storefront.orders
            ORDER BY created_at DESC, id
            ",
        )
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }
}
