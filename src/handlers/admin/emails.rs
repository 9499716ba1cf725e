// POST /api/send-emails - campaign email blast

use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::EmailService;

pub const DEFAULT_SUBJECT: &str = "CRM Campaign Email";
pub const DEFAULT_BODY: &str = "Thank you for being our valued customer!";

#[derive(Debug, Deserialize)]
pub struct SendEmailsRequest {
    pub emails: Option<Vec<String>>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// POST /api/send-emails - send one message per recipient, concurrently
///
/// Expected input:
/// ```json
/// {
///   "emails": ["a@example.com", "b@example.com"],
///   "subject": "optional",
///   "message": "optional"
/// }
/// ```
///
/// Responds with settled counts: `{"message", "sent", "failed", "errors"?}`.
/// Individual delivery failures do not fail the request.
pub async fn send_emails(Json(payload): Json<SendEmailsRequest>) -> ApiResult<Value> {
    let recipients = payload.emails.unwrap_or_default();
    if recipients.is_empty() {
        return Err(ApiError::bad_request("Email list is required"));
    }

    let subject = effective_or_default(&payload.subject, DEFAULT_SUBJECT);
    let body = effective_or_default(&payload.message, DEFAULT_BODY);

    let report = EmailService::from_config()?.send_blast(&recipients, subject, body).await;

    let message = if report.failed == 0 {
        format!("Successfully sent emails to {} recipients", report.sent)
    } else {
        format!("Sent {} emails, {} failed", report.sent, report.failed)
    };

    let mut data = json!({
        "message": message,
        "sent": report.sent,
        "failed": report.failed,
    });
    if !report.errors.is_empty() {
        data["errors"] = serde_json::to_value(&report.errors)
            .map_err(|e| ApiError::internal_server_error(e.to_string()))?;
    }

    Ok(ApiResponse::success(data))
}

fn effective_or_default<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => default,
    }
}
