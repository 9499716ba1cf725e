// GET /api/admin/export/:filename - relay a generated spreadsheet

use axum::{
    extract::Path,
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::services::{AnalyticsClient, AnalyticsError};

/// GET /api/admin/export/:filename - fetch a spreadsheet generated by the
/// analytics service and stream it back to the browser
///
/// The filename is restricted to `[A-Za-z0-9_-]` so the relay cannot be
/// steered at arbitrary service paths.
pub async fn download_export(Path(filename): Path<String>) -> Result<Response, ApiError> {
    if !is_safe_filename(&filename) {
        return Err(ApiError::bad_request("Invalid export filename"));
    }

    let (content_type, bytes) = match AnalyticsClient::new()?.download_export(&filename).await {
        Ok(payload) => payload,
        Err(AnalyticsError::ErrorResponse { status: 404, .. }) => {
            return Err(ApiError::not_found("Export file not found"));
        }
        Err(other) => return Err(other.into()),
    };

    let mut response = bytes.into_response();
    let response_headers = response.headers_mut();

    if let Ok(value) = HeaderValue::from_str(&content_type) {
        response_headers.insert(header::CONTENT_TYPE, value);
    }
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{}.xlsx\"", filename))
    {
        response_headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok(response)
}

fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_generated_export_names() {
        assert!(is_safe_filename("campaign_results_20250101_120000"));
        assert!(is_safe_filename("export-1"));
    }

    #[test]
    fn rejects_traversal_and_empty_names() {
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename("../etc/passwd"));
        assert!(!is_safe_filename("a/b"));
        assert!(!is_safe_filename("name.xlsx"));
    }
}
