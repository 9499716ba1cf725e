// POST /api/admin/query - natural-language analytics, proxied

use axum::{extract::Extension, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::AuthCustomer;
use crate::services::{AnalyticsClient, CampaignService};

#[derive(Debug, Deserialize)]
pub struct AdminQueryRequest {
    pub query: Option<String>,
}

/// POST /api/admin/query - forward a natural-language query to the
/// analytics service
///
/// The campaign audit row is written before the proxied call goes out, so
/// the query text survives even when the analytics service is down. The
/// service's JSON answer is relayed verbatim — no envelope, no rewriting.
pub async fn run_query(
    Extension(AuthCustomer(admin)): Extension<AuthCustomer>,
    Json(payload): Json<AdminQueryRequest>,
) -> Result<Json<Value>, ApiError> {
    let query = payload
        .query
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("Query text is required"))?;

    let campaigns = CampaignService::new().await?;
    let campaign = match campaigns.record(&admin.email, &query).await {
        Ok(campaign) => Some(campaign),
        Err(e) => {
            // Audit write is best-effort; the proxy call still goes out
            tracing::error!("Error saving campaign: {}", e);
            None
        }
    };

    let db_config = DatabaseManager::connection_parts()
        .map_err(|e| ApiError::upstream_failure("Request Setup Error", e.to_string()))?;

    let result = AnalyticsClient::new()?.process_query(&query, &db_config).await?;

    // Complete the audit row when the service reported a match count
    if let Some(campaign) = campaign {
        if let Some(count) = result.get("count").and_then(Value::as_i64) {
            if let Err(e) = campaigns.set_result_count(campaign.id, count as i32).await {
                tracing::error!("Error recording result count for campaign {}: {}", campaign.id, e);
            }
        }
    }

    Ok(Json(result))
}
