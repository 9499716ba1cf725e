use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Customer;
use crate::database::{DatabaseError, DatabaseManager};

/// Customer lookups and the login-time upsert
pub struct CustomerService {
    pool: PgPool,
}

impl CustomerService {
    pub async fn new() -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, DatabaseError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, DatabaseError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    /// Upsert a customer at login time. A new email gets a fresh row; a known
    /// email gets its visit counter bumped and `last_active` refreshed. The
    /// unique email constraint makes repeated logins idempotent: one row per
    /// identity, regardless of interleaving.
    pub async fn record_login(
        &self,
        email: &str,
        name: &str,
        is_admin: bool,
    ) -> Result<Customer, DatabaseError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, email, is_admin)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE
                SET visits = customers.visits + 1,
                    last_active = now()
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }
}
