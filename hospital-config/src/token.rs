// hospital-config/src/token.rs
// ============================================================================
// Module: Token Configuration
// Description: JWT signing configuration: secret/key material, issuer,
// lifetime, and algorithm selection.
// Dependencies: hospital-core
// ============================================================================

use crate::{ConfigError, EnvSource, read_parsed, read_string};

/// Minimum byte length required of a symmetric JWT secret.
const MIN_SECRET_BYTES: usize = 32;

/// Signing algorithm family for minted tokens. One scheme per deployment,
/// decided at startup — never mixed within a running process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAlgorithm {
    /// HMAC-SHA512, symmetric secret.
    Hs512,
    /// RSA-SHA256, asymmetric key pair.
    Rs256,
}

impl std::str::FromStr for TokenAlgorithm {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HS512" => Ok(Self::Hs512),
            "RS256" => Ok(Self::Rs256),
            _ => Err(()),
        }
    }
}

/// Token service configuration.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Signing algorithm for this process.
    pub algorithm: TokenAlgorithm,
    /// Symmetric secret, required when `algorithm` is HS512.
    pub secret: Option<String>,
    /// PEM-encoded RSA private key, required when `algorithm` is RS256.
    pub rsa_private_key_pem: Option<String>,
    /// PEM-encoded RSA public key, required when `algorithm` is RS256.
    pub rsa_public_key_pem: Option<String>,
    /// Access token lifetime in seconds.
    pub expiration_seconds: u64,
    /// Refresh token lifetime in seconds.
    pub refresh_expiration_seconds: u64,
    /// Token issuer claim.
    pub issuer: String,
}

impl TokenConfig {
    /// Loads token configuration from the given environment source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when required key material is absent or the
    /// symmetric secret is too short.
    pub fn load(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let algorithm = match env.get("JWT_ALGORITHM") {
            Some(raw) => raw.parse().map_err(|()| ConfigError::Invalid {
                field: "JWT_ALGORITHM".to_string(),
                reason: format!("unsupported algorithm '{raw}', expected HS512 or RS256"),
            })?,
            None => TokenAlgorithm::Hs512,
        };
        let secret = env.get("JWT_SECRET");
        if matches!(algorithm, TokenAlgorithm::Hs512) && secret.is_none() {
            return Err(ConfigError::Missing("JWT_SECRET".to_string()));
        }
        Ok(Self {
            algorithm,
            secret,
            rsa_private_key_pem: env.get("JWT_RSA_PRIVATE_KEY_PEM"),
            rsa_public_key_pem: env.get("JWT_RSA_PUBLIC_KEY_PEM"),
            expiration_seconds: read_parsed(env, "JWT_EXPIRATION_SECONDS", 86_400)?,
            refresh_expiration_seconds: read_parsed(
                env,
                "JWT_REFRESH_EXPIRATION_SECONDS",
                7 * 86_400,
            )?,
            issuer: read_string(env, "JWT_ISSUER", "hospital-system"),
        })
    }

    /// Validates internal consistency for the selected algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when required material for the selected
    /// algorithm is missing or malformed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.algorithm {
            TokenAlgorithm::Hs512 => {
                let secret = self.secret.as_ref().ok_or_else(|| ConfigError::Missing(
                    "JWT_SECRET".to_string(),
                ))?;
                if secret.len() < MIN_SECRET_BYTES {
                    return Err(ConfigError::Invalid {
                        field: "JWT_SECRET".to_string(),
                        reason: format!(
                            "must be at least {MIN_SECRET_BYTES} bytes for HS512, got {}",
                            secret.len()
                        ),
                    });
                }
            }
            TokenAlgorithm::Rs256 => {
                if self.rsa_private_key_pem.is_none() {
                    return Err(ConfigError::Missing("JWT_RSA_PRIVATE_KEY_PEM".to_string()));
                }
                if self.rsa_public_key_pem.is_none() {
                    return Err(ConfigError::Missing("JWT_RSA_PUBLIC_KEY_PEM".to_string()));
                }
            }
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "JWT_ISSUER".to_string(),
                reason: "must not be blank".to_string(),
            });
        }
        if self.expiration_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "JWT_EXPIRATION_SECONDS".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
