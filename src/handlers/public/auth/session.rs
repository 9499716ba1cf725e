// GET /auth/user and POST /auth/logout - session inspection and teardown

use axum::{
    extract::Extension,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::auth;
use crate::database::models::Customer;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthCustomer};

/// GET /auth/user - the authenticated customer's profile
///
/// The session middleware has already re-read the row, so counters and the
/// admin flag reflect the database, not the token snapshot.
pub async fn current_user(Extension(AuthCustomer(customer)): Extension<AuthCustomer>) -> ApiResult<Customer> {
    Ok(ApiResponse::success(customer))
}

/// POST /auth/logout - clear the session cookie
///
/// Deliberately public: logging out an already-anonymous browser succeeds.
pub async fn logout() -> Result<Response, ApiError> {
    let mut response =
        ApiResponse::success(json!({ "message": "Logged out successfully" })).into_response();

    let cookie = HeaderValue::from_str(&auth::clear_session_cookie())
        .map_err(|_| ApiError::internal_server_error("Failed to build session cookie"))?;
    response.headers_mut().append(header::SET_COOKIE, cookie);

    Ok(response)
}
