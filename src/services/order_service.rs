use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Order;
use crate::database::{DatabaseError, DatabaseManager};

/// Order creation and per-customer history
pub struct OrderService {
    pool: PgPool,
}

impl OrderService {
    pub async fn new() -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order, then accumulate the amount onto the customer's
    /// `total_spend`. The two writes are not transactional: a spend-update
    /// failure after the insert is logged and the order stands.
    pub async fn create_order(
        &self,
        customer_id: Uuid,
        spend: Decimal,
    ) -> Result<Order, DatabaseError> {
        let order = sqlx::query_as::<_, Order>(
            "INSERT INTO orders (customer_id, spend) VALUES ($1, $2) RETURNING *",
        )
        .bind(customer_id)
        .bind(spend)
        .fetch_one(&self.pool)
        .await?;

        let updated = sqlx::query("UPDATE customers SET total_spend = total_spend + $1 WHERE id = $2")
            .bind(spend)
            .bind(customer_id)
            .execute(&self.pool)
            .await;

        if let Err(e) = updated {
            tracing::error!(
                "Error updating total spend for customer {}: {}",
                customer_id,
                e
            );
        }

        Ok(order)
    }

    pub async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<Order>, DatabaseError> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE customer_id = $1 ORDER BY order_date DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}
