use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A customer row. Created on first OAuth login; `visits` and `last_active`
/// move on every login, `total_spend` on every order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub visits: i32,
    pub last_active: DateTime<Utc>,
    pub total_spend: Decimal,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}
