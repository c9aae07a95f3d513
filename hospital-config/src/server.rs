// hospital-config/src/server.rs
// ============================================================================
// Module: Server Configuration
// Description: The HTTP listen address for a hospital-platform binary.
// Dependencies: hospital-core
// ============================================================================

use std::net::SocketAddr;

use crate::{read_string, ConfigError, EnvSource};

/// HTTP listen address for this process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `host:port` the binary binds to, e.g. `0.0.0.0:8080`.
    pub bind: String,
}

impl ServerConfig {
    /// Loads server configuration from the given environment source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable fails to parse.
    pub fn load(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        Ok(Self { bind: read_string(env, "SERVER_BIND", "0.0.0.0:8080") })
    }

    /// Parses [`Self::bind`] into a [`SocketAddr`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configured address does not parse.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind.parse().map_err(|_| ConfigError::Invalid {
            field: "SERVER_BIND".to_string(),
            reason: format!("'{}' is not a valid host:port address", self.bind),
        })
    }

    /// Validates internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configured address does not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr().map(|_| ())
    }
}
