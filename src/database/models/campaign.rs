use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Audit record of an admin analytics query. Append-only; `result_count`
/// is filled in once the proxied call reports how many rows it matched.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Campaign {
    pub id: Uuid,
    pub admin_email: String,
    pub query_text: String,
    pub result_count: Option<i32>,
    pub created_at: DateTime<Utc>,
}
