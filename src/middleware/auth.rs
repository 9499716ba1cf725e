use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::auth;
use crate::config;
use crate::database::models::Customer;
use crate::error::ApiError;
use crate::services::CustomerService;

/// Authenticated customer for the current request. The row is re-read from
/// the database on every request, so `is_admin` and the usage counters are
/// always current — the session token only identifies the customer.
#[derive(Clone, Debug)]
pub struct AuthCustomer(pub Customer);

/// Session middleware: resolves the session cookie (or Bearer token) to a
/// customer row and injects it into the request
pub async fn session_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_session_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Not authenticated").into_response())?;

    let claims = auth::verify_session(&token).map_err(|e| {
        tracing::debug!("Session token rejected: {}", e);
        ApiError::unauthorized("Not authenticated").into_response()
    })?;

    let service = CustomerService::new()
        .await
        .map_err(|e| ApiError::from(e).into_response())?;

    let customer = service
        .find_by_id(claims.sub)
        .await
        .map_err(|e| ApiError::from(e).into_response())?
        .ok_or_else(|| {
            tracing::warn!("Session for unknown customer {}", claims.sub);
            ApiError::unauthorized("Not authenticated").into_response()
        })?;

    request.extensions_mut().insert(AuthCustomer(customer));

    Ok(next.run(request).await)
}

/// Admin gate: requires a session-authenticated customer with the admin
/// flag set. Must run after `session_auth_middleware`.
pub async fn require_admin_middleware(
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let is_admin = request
        .extensions()
        .get::<AuthCustomer>()
        .map(|c| c.0.is_admin)
        .unwrap_or(false);

    if !is_admin {
        return Err(ApiError::forbidden("Admin access required").into_response());
    }

    Ok(next.run(request).await)
}

/// Bearer tokens win for API clients; browsers carry the session cookie
fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(axum::http::header::AUTHORIZATION) {
        if let Ok(auth_str) = value.to_str() {
            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                if !token.trim().is_empty() {
                    return Some(token.trim().to_string());
                }
            }
        }
    }

    auth::extract_cookie(headers, &config::config().session.cookie_name)
}
