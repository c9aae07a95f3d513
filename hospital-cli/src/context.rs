// hospital-cli/src/context.rs
// ============================================================================
// Module: Request Context
// Description: Extracts the identity/tenant facts the gateway's
// authentication middleware injects, so handlers never re-verify a token.
// Dependencies: axum, hospital-core, hospital-gateway
// ============================================================================

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use hospital_core::ids::TenantId;
use hospital_core::HospitalError;
use hospital_gateway::auth::{HEADER_TENANT_ID, HEADER_USER_EMAIL, HEADER_USER_ID, HEADER_USER_PERMISSIONS, HEADER_USER_ROLES};
use hospital_rbac::TokenClaims;

/// The trusted identity of an authenticated caller, read exclusively from
/// the headers `authenticate` injects. Handlers must never read
/// `Authorization` themselves; the gateway pipeline has already verified it.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub tenant_id: TenantId,
    pub user_id: String,
    pub email: String,
    pub claims: TokenClaims,
}

fn header_str(parts: &Parts, name: &str) -> Option<String> {
    parts.headers.get(name).and_then(|value| value.to_str().ok()).map(str::to_string)
}

fn split_csv(value: Option<String>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = HospitalError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant_id = header_str(parts, HEADER_TENANT_ID)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| HospitalError::Unauthorized("missing trusted tenant header".to_string()))?;
        let user_id = header_str(parts, HEADER_USER_ID)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| HospitalError::Unauthorized("missing trusted user header".to_string()))?;
        let email = header_str(parts, HEADER_USER_EMAIL).unwrap_or_default();
        let roles = split_csv(header_str(parts, HEADER_USER_ROLES));
        let permissions = split_csv(header_str(parts, HEADER_USER_PERMISSIONS));

        Ok(Self {
            tenant_id: TenantId::new(tenant_id),
            user_id,
            email,
            claims: TokenClaims { roles, permissions },
        })
    }
}

impl AuthContext {
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.claims.roles.iter().any(|r| r == role)
    }
}
