// GET /api/admin/campaigns - the admin's query audit history

use axum::extract::Extension;

use crate::database::models::Campaign;
use crate::middleware::{ApiResponse, ApiResult, AuthCustomer};
use crate::services::CampaignService;

/// GET /api/admin/campaigns - campaigns issued by this admin, newest first
pub async fn list_campaigns(
    Extension(AuthCustomer(admin)): Extension<AuthCustomer>,
) -> ApiResult<Vec<Campaign>> {
    let campaigns = CampaignService::new().await?.list_for_admin(&admin.email).await?;
    Ok(ApiResponse::success(campaigns))
}
