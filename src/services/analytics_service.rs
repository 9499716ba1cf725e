use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use crate::config;
use crate::database::ConnectionParts;

/// Proxy failures, classified by HTTP shape only: the service answered with
/// an error status, never answered, or the request could not be built.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("AI Service Error: {status}")]
    ErrorResponse { status: u16, details: String },

    #[error("AI Service Connection Error")]
    NoResponse { details: String },

    #[error("Request Setup Error")]
    Setup { details: String },
}

impl AnalyticsError {
    pub fn details(&self) -> &str {
        match self {
            AnalyticsError::ErrorResponse { details, .. } => details,
            AnalyticsError::NoResponse { details } => details,
            AnalyticsError::Setup { details } => details,
        }
    }

    pub fn into_details(self) -> String {
        match self {
            AnalyticsError::ErrorResponse { details, .. } => details,
            AnalyticsError::NoResponse { details } => details,
            AnalyticsError::Setup { details } => details,
        }
    }
}

/// Thin client for the external analytics service. Queries and spreadsheet
/// downloads are both straight relays; no parsing or planning happens here.
pub struct AnalyticsClient {
    http: reqwest::Client,
    base_url: String,
}

impl AnalyticsClient {
    pub fn new() -> Result<Self, AnalyticsError> {
        let analytics = &config::config().analytics;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(analytics.timeout_secs))
            .build()
            .map_err(|e| AnalyticsError::Setup {
                details: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: analytics.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Forward a natural-language query plus database credentials and relay
    /// the JSON result verbatim.
    pub async fn process_query(
        &self,
        query: &str,
        db_config: &ConnectionParts,
    ) -> Result<Value, AnalyticsError> {
        let body = json!({
            "query": query,
            "db_config": db_config,
        });

        let response = self
            .http
            .post(format!("{}/process-query", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(AnalyticsError::ErrorResponse {
                status: status.as_u16(),
                details: non_empty_details(details),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AnalyticsError::ErrorResponse {
                status: status.as_u16(),
                details: format!("invalid JSON payload: {}", e),
            })
    }

    /// Fetch a generated spreadsheet from the analytics service.
    /// Returns the content type and raw bytes.
    pub async fn download_export(
        &self,
        filename: &str,
    ) -> Result<(String, Vec<u8>), AnalyticsError> {
        let response = self
            .http
            .get(format!("{}/download-excel/{}", self.base_url, filename))
            .send()
            .await
            .map_err(classify_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            return Err(AnalyticsError::ErrorResponse {
                status: status.as_u16(),
                details: non_empty_details(details),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AnalyticsError::NoResponse {
                details: e.to_string(),
            })?;

        Ok((content_type, bytes.to_vec()))
    }
}

fn classify_send_error(err: reqwest::Error) -> AnalyticsError {
    if err.is_builder() || err.is_request() {
        AnalyticsError::Setup {
            details: err.to_string(),
        }
    } else {
        // Connect refusals, timeouts, and dropped connections all mean the
        // same thing to the caller: no response arrived.
        AnalyticsError::NoResponse {
            details: err.to_string(),
        }
    }
}

fn non_empty_details(details: String) -> String {
    if details.trim().is_empty() {
        "No error details provided".to_string()
    } else {
        details
    }
}
