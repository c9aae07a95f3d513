// hospital-token/src/claims.rs
// ============================================================================
// Module: Token Claims
// Description: The wire shape of access and refresh tokens.
// Dependencies: serde
// ============================================================================

use serde::{Deserialize, Serialize};

/// Access token claims: `sub=userId`, tenant, identity, and the RBAC sets
/// resolved at mint time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub tenant_id: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Refresh token claims: deliberately narrow, carrying only what is needed
/// to mint a new access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    pub email: String,
    pub tenant_id: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl RefreshClaims {
    pub(crate) const TYPE: &'static str = "refresh";
}
