use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::Campaign;
use crate::database::{DatabaseError, DatabaseManager};

/// Append-only audit log of admin analytics queries
pub struct CampaignService {
    pool: PgPool,
}

impl CampaignService {
    pub async fn new() -> Result<Self, DatabaseError> {
        let pool = DatabaseManager::pool().await?;
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist the campaign row. Callers invoke this before the proxied
    /// analytics call so the audit trail survives proxy failures.
    pub async fn record(&self, admin_email: &str, query_text: &str) -> Result<Campaign, DatabaseError> {
        let campaign = sqlx::query_as::<_, Campaign>(
            "INSERT INTO campaigns (admin_email, query_text) VALUES ($1, $2) RETURNING *",
        )
        .bind(admin_email)
        .bind(query_text)
        .fetch_one(&self.pool)
        .await?;

        Ok(campaign)
    }

    /// Record how many rows the analytics service reported for a campaign
    pub async fn set_result_count(&self, id: Uuid, count: i32) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE campaigns SET result_count = $1 WHERE id = $2")
            .bind(count)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn list_for_admin(&self, admin_email: &str) -> Result<Vec<Campaign>, DatabaseError> {
        let campaigns = sqlx::query_as::<_, Campaign>(
            "SELECT * FROM campaigns WHERE admin_email = $1 ORDER BY created_at DESC",
        )
        .bind(admin_email)
        .fetch_all(&self.pool)
        .await?;

        Ok(campaigns)
    }
}
