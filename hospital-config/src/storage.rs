// hospital-config/src/storage.rs
// ============================================================================
// Module: Storage Configuration
// Description: Selects between the in-memory reference stores and the
// durable SQLite-backed identity/audit stores.
// Dependencies: hospital-core
// ============================================================================

use crate::{ConfigError, EnvSource};

/// Storage backend configuration. Absent `DATABASE_PATH` means every
/// process-local store stays in memory, which is the default for tests and
/// single-shot demos; setting it switches identity and audit to the
/// `SQLite`-backed implementations at the same path.
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// Filesystem path to the `SQLite` database file. `None` selects the
    /// in-memory reference stores.
    pub database_path: Option<String>,
}

impl StorageConfig {
    /// Loads storage configuration from the given environment source.
    ///
    /// # Errors
    ///
    /// Never fails today; kept `Result`-returning for symmetry with the
    /// other configuration sections and to absorb future validation.
    pub fn load(env: &dyn EnvSource) -> Result<Self, ConfigError> {
        Ok(Self {
            database_path: env.get("DATABASE_PATH"),
        })
    }

    /// Validates internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `DATABASE_PATH` is set but blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.database_path {
            if path.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field: "DATABASE_PATH".to_string(),
                    reason: "must not be blank when set".to_string(),
                });
            }
        }
        Ok(())
    }
}
