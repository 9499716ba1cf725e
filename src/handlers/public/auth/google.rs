// GET /auth/google and GET /auth/google/callback - the OAuth login flow

use axum::{
    extract::Query,
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth;
use crate::config;
use crate::error::ApiError;
use crate::services::{CustomerService, OAuthService};

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set by Google when the user denies consent
    pub error: Option<String>,
}

/// GET /auth/google - start the consent flow
///
/// Redirects to Google's consent screen and pins a state nonce in a
/// short-lived cookie so the callback can reject forged redirects.
pub async fn google_redirect() -> Result<Response, ApiError> {
    let state = Uuid::new_v4().simple().to_string();
    let authorize_url = OAuthService::new().authorize_url(&state)?;

    let mut response = Redirect::temporary(&authorize_url).into_response();
    response
        .headers_mut()
        .append(header::SET_COOKIE, cookie_header(auth::state_cookie(&state))?);
    Ok(response)
}

/// GET /auth/google/callback - finish the consent flow
///
/// Exchanges the code for a Google profile, upserts the customer row
/// (new email -> new customer, known email -> visit bump), and establishes
/// the session cookie. Any provider-side failure bounces the browser back
/// to the SPA login page instead of surfacing an API error.
pub async fn google_callback(
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Result<Response, ApiError> {
    let client_url = &config::config().server.client_url;
    let login_url = format!("{}/login", client_url);

    if let Some(provider_error) = &params.error {
        tracing::warn!("Google consent denied: {}", provider_error);
        return Ok(Redirect::temporary(&login_url).into_response());
    }

    let (code, state) = match (&params.code, &params.state) {
        (Some(code), Some(state)) => (code, state),
        _ => return Ok(Redirect::temporary(&login_url).into_response()),
    };

    let expected_state = auth::extract_cookie(&headers, auth::STATE_COOKIE);
    if expected_state.as_deref() != Some(state.as_str()) {
        tracing::warn!("OAuth callback state mismatch");
        return Ok(Redirect::temporary(&login_url).into_response());
    }

    let profile = match OAuthService::new().exchange_code(code).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("OAuth code exchange failed: {}", e);
            return Ok(Redirect::temporary(&login_url).into_response());
        }
    };

    let is_admin = config::config().is_admin_email(&profile.email);
    let customer = CustomerService::new()
        .await?
        .record_login(&profile.email, profile.display_name(), is_admin)
        .await?;

    tracing::info!("Customer {} logged in (visit {})", customer.email, customer.visits);

    let token = auth::issue_session(&customer)?;

    let mut response = Redirect::temporary(client_url).into_response();
    let response_headers = response.headers_mut();
    response_headers.append(header::SET_COOKIE, cookie_header(auth::session_cookie(&token))?);
    response_headers.append(header::SET_COOKIE, cookie_header(auth::clear_state_cookie())?);
    Ok(response)
}

fn cookie_header(cookie: String) -> Result<HeaderValue, ApiError> {
    HeaderValue::from_str(&cookie)
        .map_err(|_| ApiError::internal_server_error("Failed to build session cookie"))
}
