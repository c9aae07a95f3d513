// hospital-store-sqlite/src/error.rs
// ============================================================================
// Module: SQLite Store Errors
// Description: Internal error taxonomy for the SQLite-backed stores, mapped
// onto the workspace-wide HospitalError at the trait boundary.
// Dependencies: hospital-core, rusqlite, thiserror, tokio
// ============================================================================

use hospital_core::HospitalError;
use thiserror::Error;

/// Errors internal to the `SQLite` stores, before being folded into
/// [`HospitalError`] at the public trait boundary.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// The `SQLite` engine rejected a statement, or the connection could not
    /// be opened or configured.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// A row violated an application-level invariant the schema itself
    /// cannot express (e.g. (tenant_id, email) uniqueness).
    #[error("{0}")]
    Conflict(String),
    /// A blocking database task panicked or was cancelled.
    #[error("sqlite store task join error: {0}")]
    Join(String),
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(error: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(sqlite_error, message) = &error {
            if sqlite_error.code == rusqlite::ErrorCode::ConstraintViolation {
                return Self::Conflict(message.clone().unwrap_or_else(|| error.to_string()));
            }
        }
        Self::Db(error.to_string())
    }
}

impl From<tokio::task::JoinError> for SqliteStoreError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::Join(error.to_string())
    }
}

impl From<SqliteStoreError> for HospitalError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
            SqliteStoreError::Db(message) | SqliteStoreError::Join(message) => Self::Unexpected(message),
        }
    }
}
