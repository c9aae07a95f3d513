// hospital-token/src/service.rs
// ============================================================================
// Module: Token Service
// Description: Mints and verifies access/refresh tokens under one fixed
// algorithm per process.
// Dependencies: hospital-config, hospital-core, jsonwebtoken, time
// ============================================================================

use hospital_config::{TokenAlgorithm, TokenConfig};
use hospital_core::Clock;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::{AccessClaims, RefreshClaims};
use crate::error::TokenError;

/// Clock skew tolerated on verification, in both directions.
const LEEWAY_SECONDS: u64 = 60;

/// Input describing the identity and RBAC facts to mint a token for.
#[derive(Debug, Clone)]
pub struct MintRequest {
    pub user_id: String,
    pub tenant_id: String,
    pub email: String,
    pub name: String,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub department: Option<String>,
}

/// Signs and verifies tokens for one fixed algorithm, decided at startup
/// from [`TokenConfig`] and never changed for the life of the process.
pub struct TokenService {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    expiration_seconds: i64,
    refresh_expiration_seconds: i64,
}

impl TokenService {
    /// Builds a token service from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] when RSA key material fails to
    /// parse.
    pub fn new(config: &TokenConfig) -> Result<Self, TokenError> {
        let (algorithm, encoding_key, decoding_key) = match config.algorithm {
            TokenAlgorithm::Hs512 => {
                let secret = config.secret.as_deref().unwrap_or_default();
                (
                    Algorithm::HS512,
                    EncodingKey::from_secret(secret.as_bytes()),
                    DecodingKey::from_secret(secret.as_bytes()),
                )
            }
            TokenAlgorithm::Rs256 => {
                let private_pem = config.rsa_private_key_pem.as_deref().unwrap_or_default();
                let public_pem = config.rsa_public_key_pem.as_deref().unwrap_or_default();
                let encoding_key = EncodingKey::from_rsa_pem(private_pem.as_bytes())
                    .map_err(|err| TokenError::Encoding(err.to_string()))?;
                let decoding_key = DecodingKey::from_rsa_pem(public_pem.as_bytes())
                    .map_err(|err| TokenError::Encoding(err.to_string()))?;
                (Algorithm::RS256, encoding_key, decoding_key)
            }
        };
        Ok(Self {
            algorithm,
            encoding_key,
            decoding_key,
            issuer: config.issuer.clone(),
            expiration_seconds: i64::try_from(config.expiration_seconds).unwrap_or(i64::MAX),
            refresh_expiration_seconds: i64::try_from(config.refresh_expiration_seconds)
                .unwrap_or(i64::MAX),
        })
    }

    /// Mints a signed access token carrying the RBAC claim set at mint time.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] when signing fails.
    pub fn mint_access_token(
        &self,
        clock: &dyn Clock,
        request: &MintRequest,
    ) -> Result<String, TokenError> {
        let now = clock.now().unix_timestamp();
        let claims = AccessClaims {
            sub: request.user_id.clone(),
            tenant_id: request.tenant_id.clone(),
            email: request.email.clone(),
            name: request.name.clone(),
            roles: request.roles.clone(),
            permissions: request.permissions.clone(),
            department: request.department.clone(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.expiration_seconds,
        };
        self.encode(&claims)
    }

    /// Mints a signed refresh token, carrying only `sub`/`email`/`tenantId`.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Encoding`] when signing fails.
    pub fn mint_refresh_token(
        &self,
        clock: &dyn Clock,
        user_id: &str,
        email: &str,
        tenant_id: &str,
    ) -> Result<String, TokenError> {
        let now = clock.now().unix_timestamp();
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            tenant_id: tenant_id.to_string(),
            token_type: RefreshClaims::TYPE.to_string(),
            iss: self.issuer.clone(),
            iat: now,
            exp: now + self.refresh_expiration_seconds,
        };
        self.encode(&claims)
    }

    /// Verifies and decodes an access token, rejecting tokens without a
    /// `tenant_id` claim.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`], [`TokenError::Expired`], or
    /// [`TokenError::MissingTenant`].
    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let claims = self.decode::<AccessClaims>(token)?;
        if claims.tenant_id.trim().is_empty() {
            return Err(TokenError::MissingTenant);
        }
        Ok(claims)
    }

    /// Verifies and decodes a refresh token, rejecting access tokens
    /// presented where a refresh token is expected.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Invalid`], [`TokenError::Expired`], or
    /// [`TokenError::NotARefreshToken`].
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims = self.decode::<RefreshClaims>(token)?;
        if claims.token_type != RefreshClaims::TYPE {
            return Err(TokenError::NotARefreshToken);
        }
        Ok(claims)
    }

    fn encode<T: serde::Serialize>(&self, claims: &T) -> Result<String, TokenError> {
        let header = Header::new(self.algorithm);
        encode(&header, claims, &self.encoding_key).map_err(|err| TokenError::Encoding(err.to_string()))
    }

    fn decode<T: serde::de::DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = LEEWAY_SECONDS;
        validation.set_issuer(&[self.issuer.clone()]);
        decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}
