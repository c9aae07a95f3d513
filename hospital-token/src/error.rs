// hospital-token/src/error.rs
// ============================================================================
// Module: Token Errors
// Description: Failures minting or verifying a token.
// Dependencies: thiserror
// ============================================================================

use hospital_core::HospitalError;
use thiserror::Error;

/// Failures from [`crate::TokenService`].
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token is malformed or its signature does not verify")]
    Invalid,
    #[error("token has expired")]
    Expired,
    #[error("token is missing a required tenant claim")]
    MissingTenant,
    #[error("token is not a refresh token")]
    NotARefreshToken,
    #[error("failed to sign or encode token: {0}")]
    Encoding(String),
}

impl From<TokenError> for HospitalError {
    fn from(err: TokenError) -> Self {
        HospitalError::Unauthorized(err.to_string())
    }
}
