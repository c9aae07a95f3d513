// hospital-config/src/identity.rs
// ============================================================================
// Module: Identity Configuration
// Description: Lockout thresholds for the identity store's login state
// machine.
// Dependencies: hospital-core
// ============================================================================

use crate::{ConfigError, EnvSource, read_parsed};

/// Identity store configuration.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Consecutive failed logins before lockout.
    pub lockout_threshold: u32,
    /// Lockout duration, in minutes.
    pub lockout_duration_minutes: u32,
}

impl IdentityConfig {
    /// Loads identity configuration from the given environment source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable fails to parse.
    pub fn load(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        Ok(Self {
            lockout_threshold: read_parsed(env, "LOCKOUT_THRESHOLD", 5)?,
            lockout_duration_minutes: read_parsed(env, "LOCKOUT_DURATION_MINUTES", 30)?,
        })
    }

    /// Validates internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the threshold or duration is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lockout_threshold == 0 {
            return Err(ConfigError::Invalid {
                field: "LOCKOUT_THRESHOLD".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.lockout_duration_minutes == 0 {
            return Err(ConfigError::Invalid {
                field: "LOCKOUT_DURATION_MINUTES".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}
