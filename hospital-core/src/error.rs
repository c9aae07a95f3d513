// hospital-core/src/error.rs
// ============================================================================
// Module: Error Taxonomy
// Description: Uniform error kinds shared by every service, independent of
// any particular HTTP framework.
// Purpose: Give every crate one vocabulary for business and transport errors.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! [`HospitalError`] is the single error type threaded through every crate in
//! the workspace. It carries a stable `code`, a user-safe `message`, and
//! optional field-level errors. HTTP framing (status codes, the JSON
//! envelope) lives in `hospital-gateway`; this module only knows the
//! taxonomy and the mapping to a numeric status so any transport can reuse it.

use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
    /// The value that was rejected, if safe to echo back.
    pub rejected_value: Option<String>,
}

impl FieldError {
    /// Builds a field error without echoing the rejected value.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rejected_value: None,
        }
    }
}

/// Uniform error taxonomy per the error-handling design.
#[derive(Debug, Error)]
pub enum HospitalError {
    /// Request failed validation. HTTP 400.
    #[error("{0}")]
    Validation(String),
    /// Request failed validation with field-level detail. HTTP 400.
    #[error("validation failed")]
    ValidationFields(Vec<FieldError>),
    /// Missing or invalid credentials. HTTP 401.
    #[error("{0}")]
    Unauthorized(String),
    /// Authenticated but not permitted. HTTP 403.
    #[error("{0}")]
    Forbidden(String),
    /// Resource does not exist. HTTP 404.
    #[error("{0}")]
    NotFound(String),
    /// Resource already exists / state conflict. HTTP 409.
    #[error("{0}")]
    Conflict(String),
    /// Caller exceeded their rate limit. HTTP 429.
    #[error("rate limit exceeded")]
    RateLimited,
    /// A downstream service could not be reached. HTTP 503.
    #[error("{0}")]
    UpstreamUnavailable(String),
    /// A downstream service did not respond in time. HTTP 504.
    #[error("{0}")]
    UpstreamTimeout(String),
    /// An unanticipated failure. HTTP 500.
    #[error("{0}")]
    Unexpected(String),
}

impl HospitalError {
    /// Returns the stable machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::ValidationFields(_) => "VALIDATION",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::RateLimited => "RATE_LIMITED",
            Self::UpstreamUnavailable(_) => "UPSTREAM_UNAVAILABLE",
            Self::UpstreamTimeout(_) => "UPSTREAM_TIMEOUT",
            Self::Unexpected(_) => "UNEXPECTED",
        }
    }

    /// Returns the HTTP status code this error kind maps to.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::ValidationFields(_) => 400,
            Self::Unauthorized(_) => 401,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::Conflict(_) => 409,
            Self::RateLimited => 429,
            Self::Unexpected(_) => 500,
            Self::UpstreamUnavailable(_) => 503,
            Self::UpstreamTimeout(_) => 504,
        }
    }

    /// Returns true when this error kind must not be logged with a stack
    /// trace (4xx family).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }

    /// Field-level errors, if any were attached.
    #[must_use]
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            Self::ValidationFields(fields) => Some(fields),
            _ => None,
        }
    }

    /// The user-safe message, without internal detail.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }
}
