// hospital-config/src/gateway.rs
// ============================================================================
// Module: Gateway Configuration
// Description: Rate-limit knobs and request-pipeline timeouts for the edge
// gateway.
// Dependencies: hospital-core
// ============================================================================

use crate::{ConfigError, EnvSource, read_bool, read_parsed};

/// Edge gateway pipeline configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Whether the rate limiter is enforced.
    pub rate_limit_enabled: bool,
    /// Requests per minute per key.
    pub rate_limit_rpm: u32,
    /// Burst allowance per key.
    pub rate_limit_burst: u32,
    /// End-to-end request timeout, in seconds.
    pub request_timeout_seconds: u64,
    /// Maximum buffered request body size, in bytes.
    pub max_body_bytes: usize,
}

impl GatewayConfig {
    /// Loads gateway configuration from the given environment source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable fails to parse.
    pub fn load(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        Ok(Self {
            rate_limit_enabled: read_bool(env, "RATE_LIMIT_ENABLED", true)?,
            rate_limit_rpm: read_parsed(env, "RATE_LIMIT_RPM", 100)?,
            rate_limit_burst: read_parsed(env, "RATE_LIMIT_BURST", 20)?,
            request_timeout_seconds: read_parsed(env, "GATEWAY_REQUEST_TIMEOUT_SECONDS", 30)?,
            max_body_bytes: read_parsed(env, "GATEWAY_MAX_BODY_BYTES", 10 * 1024 * 1024)?,
        })
    }

    /// Validates internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a rate-limit or timeout value is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit_enabled && self.rate_limit_burst == 0 {
            return Err(ConfigError::Invalid {
                field: "RATE_LIMIT_BURST".to_string(),
                reason: "must be positive when rate limiting is enabled".to_string(),
            });
        }
        if self.rate_limit_enabled && self.rate_limit_rpm == 0 {
            return Err(ConfigError::Invalid {
                field: "RATE_LIMIT_RPM".to_string(),
                reason: "must be positive when rate limiting is enabled".to_string(),
            });
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "GATEWAY_REQUEST_TIMEOUT_SECONDS".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
