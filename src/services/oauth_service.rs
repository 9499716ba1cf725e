use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

const HTTP_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("Google OAuth client is not configured")]
    NotConfigured,

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Userinfo fetch failed: {0}")]
    Userinfo(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Identity assertion returned by Google's userinfo endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

impl GoogleProfile {
    /// Display name, falling back to the email local part when Google
    /// returns no name.
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        self.email.split('@').next().unwrap_or(&self.email)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google OAuth code flow: consent redirect, code-for-token exchange,
/// and profile fetch. The provider itself stays external.
pub struct OAuthService {
    http: reqwest::Client,
}

impl OAuthService {
    pub fn new() -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http }
    }

    /// Consent-screen URL carrying the CSRF state nonce
    pub fn authorize_url(&self, state: &str) -> Result<String, OAuthError> {
        let google = &config::config().google;
        if google.client_id.is_empty() {
            return Err(OAuthError::NotConfigured);
        }
        Ok(build_authorize_url(
            &google.client_id,
            &google.callback_url,
            state,
        ))
    }

    /// Exchange the callback code for an access token, then fetch the
    /// user's profile.
    pub async fn exchange_code(&self, code: &str) -> Result<GoogleProfile, OAuthError> {
        let google = &config::config().google;
        if google.client_id.is_empty() || google.client_secret.is_empty() {
            return Err(OAuthError::NotConfigured);
        }

        let params = [
            ("code", code),
            ("client_id", google.client_id.as_str()),
            ("client_secret", google.client_secret.as_str()),
            ("redirect_uri", google.callback_url.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::TokenExchange(format!(
                "status {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| OAuthError::TokenExchange(e.to_string()))?;

        let response = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OAuthError::Userinfo(format!(
                "status {}",
                response.status()
            )));
        }

        let profile: GoogleProfile = response
            .json()
            .await
            .map_err(|e| OAuthError::Userinfo(e.to_string()))?;

        if profile.email.is_empty() {
            return Err(OAuthError::Userinfo("profile has no email".to_string()));
        }

        Ok(profile)
    }
}

impl Default for OAuthService {
    fn default() -> Self {
        Self::new()
    }
}

fn build_authorize_url(client_id: &str, callback_url: &str, state: &str) -> String {
    let mut url = url::Url::parse(GOOGLE_AUTH_URL).expect("static auth url");
    url.query_pairs_mut()
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", callback_url)
        .append_pair("response_type", "code")
        .append_pair("scope", "openid email profile")
        .append_pair("state", state);
    url.to_string()
}
