// hospital-gateway/src/error.rs
// ============================================================================
// Module: Gateway Error Envelope
// Description: Renders HospitalError as the uniform JSON error body, the
// only place in the workspace that couples the error taxonomy to HTTP.
// Dependencies: axum, hospital-core, serde, serde_json, time
// ============================================================================

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hospital_core::HospitalError;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// `{timestamp, status, error, errorCode, message, path, fieldErrors?}`, the
/// uniform error envelope every gateway-originated failure renders as.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    timestamp: String,
    status: u16,
    error: &'static str,
    error_code: &'static str,
    message: String,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_errors: Option<Vec<FieldErrorBody>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FieldErrorBody {
    field: String,
    message: String,
    rejected_value: Option<String>,
}

fn reason_phrase(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("Error")
}

/// Renders a [`HospitalError`] as the uniform JSON envelope for a given
/// request path. 4xx responses are not logged with a stack trace; 5xx are.
#[must_use]
pub fn render(error: &HospitalError, path: &str) -> Response {
    let status = error.http_status();
    if error.is_client_error() {
        tracing::warn!(status, code = error.code(), path, "request rejected");
    } else {
        tracing::error!(status, code = error.code(), path, error = %error, "request failed");
    }

    let body = ErrorBody {
        timestamp: OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string()),
        status,
        error: reason_phrase(status),
        error_code: error.code(),
        message: error.message(),
        path: path.to_string(),
        field_errors: error.field_errors().map(|fields| {
            fields
                .iter()
                .map(|field| FieldErrorBody {
                    field: field.field.clone(),
                    message: field.message.clone(),
                    rejected_value: field.rejected_value.clone(),
                })
                .collect()
        }),
    };

    let status_code = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status_code, Json(body)).into_response()
}
