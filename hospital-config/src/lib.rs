// hospital-config/src/lib.rs
// ============================================================================
// Module: Hospital Config
// Description: Environment-driven configuration loading and fail-closed
// validation for every process in the workspace.
// Purpose: One typed, validated entry point for every env var named in the
// external-interfaces configuration table.
// Dependencies: hospital-core, serde, thiserror
// ============================================================================

//! ## Overview
//! Configuration is resolved from process environment variables with typed
//! defaults, then validated before any service is allowed to start — the
//! same fail-closed posture the teacher's TOML-file loader uses, adapted to
//! an env-var source since this platform is a fleet of small services
//! configured the twelve-factor way rather than a single local binary reading
//! a config file from disk.

mod gateway;
mod identity;
mod server;
mod storage;
mod token;

pub use gateway::GatewayConfig;
pub use identity::IdentityConfig;
pub use server::ServerConfig;
pub use storage::StorageConfig;
pub use token::{TokenAlgorithm, TokenConfig};

use std::collections::HashMap;
use std::env;

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable was absent.
    #[error("missing required configuration: {0}")]
    Missing(String),
    /// A variable was present but could not be parsed or was out of range.
    #[error("invalid configuration for {field}: {reason}")]
    Invalid {
        /// Offending field name.
        field: String,
        /// Human-readable reason.
        reason: String,
    },
}

/// Reads environment variables through a trait so tests can inject a map
/// instead of mutating the real process environment.
pub trait EnvSource {
    /// Returns the value of `key`, if set.
    fn get(&self, key: &str) -> Option<String>;
}

/// Reads from the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// An in-memory environment, for deterministic tests.
#[derive(Debug, Default, Clone)]
pub struct MapEnv(pub HashMap<String, String>);

impl EnvSource for MapEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

fn read_string(env: &dyn EnvSource, key: &str, default: &str) -> String {
    env.get(key).unwrap_or_else(|| default.to_string())
}

fn read_parsed<T: std::str::FromStr>(
    env: &dyn EnvSource,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match env.get(key) {
        None => Ok(default),
        Some(raw) => raw.parse::<T>().map_err(|_| ConfigError::Invalid {
            field: key.to_string(),
            reason: format!("could not parse '{raw}'"),
        }),
    }
}

fn read_bool(env: &dyn EnvSource, key: &str, default: bool) -> Result<bool, ConfigError> {
    read_parsed(env, key, default)
}

/// Top-level configuration for a hospital-platform process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen address.
    pub server: ServerConfig,
    /// Token service configuration.
    pub token: TokenConfig,
    /// Gateway pipeline configuration.
    pub gateway: GatewayConfig,
    /// Identity/lockout configuration.
    pub identity: IdentityConfig,
    /// Storage backend selection.
    pub storage: StorageConfig,
    /// Tenant id assumed when a request carries none.
    pub default_tenant_id: String,
}

impl AppConfig {
    /// Loads and validates configuration from the given environment source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a required variable is missing or a
    /// present one fails validation.
    pub fn load(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        let config = Self {
            server: ServerConfig::load(env)?,
            token: TokenConfig::load(env)?,
            gateway: GatewayConfig::load(env)?,
            identity: IdentityConfig::load(env)?,
            storage: StorageConfig::load(env)?,
            default_tenant_id: read_string(env, "DEFAULT_TENANT_ID", "default-tenant"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from the real process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] under the same conditions as [`Self::load`].
    pub fn load_from_process_env() -> Result<Self, ConfigError> {
        Self::load(&ProcessEnv)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_tenant_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "DEFAULT_TENANT_ID".to_string(),
                reason: "must not be blank".to_string(),
            });
        }
        self.server.validate()?;
        self.token.validate()?;
        self.gateway.validate()?;
        self.identity.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(pairs: &[(&str, &str)]) -> MapEnv {
        MapEnv(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        )
    }

    #[test]
    fn load_fails_closed_without_jwt_secret() {
        let env = env_with(&[]);
        let err = AppConfig::load(&env).expect_err("jwt secret required");
        assert!(matches!(err, ConfigError::Missing(field) if field == "JWT_SECRET"));
    }

    #[test]
    fn load_applies_documented_defaults() {
        let env = env_with(&[("JWT_SECRET", "a-very-long-development-secret-value-123456")]);
        let config = AppConfig::load(&env).expect("valid config");
        assert_eq!(config.token.expiration_seconds, 86_400);
        assert_eq!(config.token.issuer, "hospital-system");
        assert!(config.gateway.rate_limit_enabled);
        assert_eq!(config.gateway.rate_limit_rpm, 100);
        assert_eq!(config.gateway.rate_limit_burst, 20);
        assert_eq!(config.identity.lockout_threshold, 5);
        assert_eq!(config.identity.lockout_duration_minutes, 30);
        assert_eq!(config.default_tenant_id, "default-tenant");
    }

    #[test]
    fn blank_default_tenant_id_rejected() {
        let env = env_with(&[
            ("JWT_SECRET", "a-very-long-development-secret-value-123456"),
            ("DEFAULT_TENANT_ID", "   "),
        ]);
        assert!(AppConfig::load(&env).is_err());
    }
}
