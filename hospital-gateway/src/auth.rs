// hospital-gateway/src/auth.rs
// ============================================================================
// Module: Authentication Middleware
// Description: Extracts and verifies the bearer access token, then injects
// the X-Tenant-Id / X-User-* headers the downstream services trust.
// Dependencies: axum, hospital-core, hospital-token
// ============================================================================

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use hospital_core::HospitalError;
use hospital_token::AccessClaims;

use crate::discovery::is_public_path;
use crate::state::AppState;

/// Header names the gateway injects for every authenticated request. Kept
/// together so the proxy layer and tests reference the same constants.
pub const HEADER_TENANT_ID: &str = "x-tenant-id";
pub const HEADER_USER_ID: &str = "x-user-id";
pub const HEADER_USER_EMAIL: &str = "x-user-email";
pub const HEADER_USER_ROLES: &str = "x-user-roles";
pub const HEADER_USER_PERMISSIONS: &str = "x-user-permissions";

fn bearer_token(request: &Request) -> Result<&str, HospitalError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| HospitalError::Unauthorized("missing Authorization header".to_string()))?;
    let value = header
        .to_str()
        .map_err(|_| HospitalError::Unauthorized("Authorization header is not valid UTF-8".to_string()))?;
    value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or_else(|| HospitalError::Unauthorized("Authorization header must be a Bearer token".to_string()))
}

fn header_value(value: &str) -> HeaderValue {
    HeaderValue::from_str(value).unwrap_or_else(|_| HeaderValue::from_static(""))
}

/// Verifies the request's bearer token and injects the trusted identity
/// headers the downstream services read instead of re-verifying the token
/// themselves. Public paths (login, register, health, metrics, docs) skip
/// this entirely.
pub async fn authenticate(State(state): State<Arc<AppState>>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if is_public_path(&path) {
        return next.run(request).await;
    }

    let claims: AccessClaims = match bearer_token(&request).and_then(|token| {
        state.tokens.verify_access_token(token).map_err(HospitalError::from)
    }) {
        Ok(claims) => claims,
        Err(error) => return crate::error::render(&error, &path),
    };

    let headers = request.headers_mut();
    headers.insert(HEADER_TENANT_ID, header_value(&claims.tenant_id));
    headers.insert(HEADER_USER_ID, header_value(&claims.sub));
    headers.insert(HEADER_USER_EMAIL, header_value(&claims.email));
    headers.insert(HEADER_USER_ROLES, header_value(&claims.roles.join(",")));
    headers.insert(HEADER_USER_PERMISSIONS, header_value(&claims.permissions.join(",")));

    next.run(request).await
}
