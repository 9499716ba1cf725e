use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config;
use crate::database::models::Customer;

/// Cookie holding the OAuth CSRF state between redirect and callback
pub const STATE_COOKIE: &str = "crm_oauth_state";

const STATE_COOKIE_MAX_AGE_SECS: u64 = 600;

/// Session token claims. The customer id is the only authoritative field;
/// profile claims are a convenience snapshot and the database is re-read on
/// every request.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    pub fn new(customer: &Customer) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().session.expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: customer.id,
            email: customer.email.clone(),
            name: customer.name.clone(),
            is_admin: customer.is_admin,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Session secret is not configured")]
    MissingSecret,

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error("Invalid session token: {0}")]
    InvalidToken(String),
}

/// Issue a signed session token for a customer
pub fn issue_session(customer: &Customer) -> Result<String, SessionError> {
    let secret = &config::config().session.secret;
    encode_with_secret(&SessionClaims::new(customer), secret)
}

/// Validate a session token and return its claims
pub fn verify_session(token: &str) -> Result<SessionClaims, SessionError> {
    let secret = &config::config().session.secret;
    decode_with_secret(token, secret)
}

fn encode_with_secret(claims: &SessionClaims, secret: &str) -> Result<String, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::MissingSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| SessionError::TokenGeneration(e.to_string()))
}

fn decode_with_secret(token: &str, secret: &str) -> Result<SessionClaims, SessionError> {
    if secret.is_empty() {
        return Err(SessionError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let token_data = decode::<SessionClaims>(token, &decoding_key, &Validation::default())
        .map_err(|e| SessionError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// Set-Cookie value establishing the session
pub fn session_cookie(token: &str) -> String {
    let session = &config::config().session;
    let max_age = session.expiry_hours * 3600;
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        session.cookie_name,
        token,
        max_age,
        secure_suffix()
    )
}

/// Set-Cookie value clearing the session
pub fn clear_session_cookie() -> String {
    let session = &config::config().session;
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
        session.cookie_name,
        secure_suffix()
    )
}

/// Set-Cookie value holding the OAuth state nonce
pub fn state_cookie(state: &str) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        STATE_COOKIE,
        state,
        STATE_COOKIE_MAX_AGE_SECS,
        secure_suffix()
    )
}

/// Set-Cookie value clearing the OAuth state nonce
pub fn clear_state_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
        STATE_COOKIE,
        secure_suffix()
    )
}

fn secure_suffix() -> &'static str {
    if config::config().is_production() {
        "; Secure"
    } else {
        ""
    }
}

/// Extract a named cookie from request headers
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    cookie_value(header, name)
}

fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        if key == name && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample_customer() -> Customer {
        Customer {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            visits: 3,
            last_active: Utc::now(),
            total_spend: Decimal::ZERO,
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    fn sample_claims(customer: &Customer, exp: i64) -> SessionClaims {
        SessionClaims {
            sub: customer.id,
            email: customer.email.clone(),
            name: customer.name.clone(),
            is_admin: customer.is_admin,
            exp,
            iat: Utc::now().timestamp(),
        }
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let customer = sample_customer();
        let claims = sample_claims(&customer, (Utc::now() + Duration::hours(1)).timestamp());

        let token = encode_with_secret(&claims, "unit-test-secret").unwrap();
        let decoded = decode_with_secret(&token, "unit-test-secret").unwrap();

        assert_eq!(decoded.sub, customer.id);
        assert_eq!(decoded.email, customer.email);
        assert!(!decoded.is_admin);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let customer = sample_customer();
        let claims = sample_claims(&customer, (Utc::now() + Duration::hours(1)).timestamp());

        let token = encode_with_secret(&claims, "secret-a").unwrap();
        let result = decode_with_secret(&token, "secret-b");
        assert!(matches!(result, Err(SessionError::InvalidToken(_))));
    }

    #[test]
    fn expired_token_is_rejected() {
        let customer = sample_customer();
        let claims = sample_claims(&customer, (Utc::now() - Duration::hours(2)).timestamp());

        let token = encode_with_secret(&claims, "unit-test-secret").unwrap();
        let result = decode_with_secret(&token, "unit-test-secret");
        assert!(matches!(result, Err(SessionError::InvalidToken(_))));
    }

    #[test]
    fn empty_secret_is_rejected() {
        let customer = sample_customer();
        let claims = sample_claims(&customer, (Utc::now() + Duration::hours(1)).timestamp());
        assert!(matches!(
            encode_with_secret(&claims, ""),
            Err(SessionError::MissingSecret)
        ));
    }

    #[test]
    fn cookie_value_finds_named_cookie() {
        let header = "theme=dark; crm_session=abc.def.ghi; other=1";
        assert_eq!(
            cookie_value(header, "crm_session"),
            Some("abc.def.ghi".to_string())
        );
        assert_eq!(cookie_value(header, "theme"), Some("dark".to_string()));
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn cookie_value_ignores_empty_values() {
        assert_eq!(cookie_value("crm_session=", "crm_session"), None);
    }
}
