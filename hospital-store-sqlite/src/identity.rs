// hospital-store-sqlite/src/identity.rs
// ============================================================================
// Module: SQLite Identity Store
// Description: Durable IdentityStore implementation backed by SQLite WAL,
// for single-node deployments that opt out of the in-memory reference
// store.
// Dependencies: async-trait, hospital-core, hospital-identity, rusqlite,
// time, tokio
// ============================================================================

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hospital_core::ids::{TenantId, UserId};
use hospital_core::HospitalError;
use hospital_identity::{IdentityStore, User};
use rusqlite::{Connection, OptionalExtension, Row, params};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::SqliteStoreError;
use crate::schema;

fn to_rfc3339(value: OffsetDateTime) -> Result<String, SqliteStoreError> {
    value.format(&Rfc3339).map_err(|error| SqliteStoreError::Db(error.to_string()))
}

fn from_rfc3339(value: &str) -> rusqlite::Result<OffsetDateTime> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(error)))
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let locked_until: Option<String> = row.get("locked_until")?;
    let last_login_at: Option<String> = row.get("last_login_at")?;
    Ok(User {
        id: UserId::new(row.get::<_, String>("id")?),
        tenant_id: TenantId::new(row.get::<_, String>("tenant_id")?),
        name: row.get("name")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        phone: row.get("phone")?,
        active: row.get::<_, i64>("active")? != 0,
        email_verified: row.get::<_, i64>("email_verified")? != 0,
        failed_attempts: u32::try_from(row.get::<_, i64>("failed_attempts")?).unwrap_or(0),
        locked_until: locked_until.map(|value| from_rfc3339(&value)).transpose()?,
        last_login_at: last_login_at.map(|value| from_rfc3339(&value)).transpose()?,
        password_changed_at: from_rfc3339(&row.get::<_, String>("password_changed_at")?)?,
        created_at: from_rfc3339(&row.get::<_, String>("created_at")?)?,
        updated_at: from_rfc3339(&row.get::<_, String>("updated_at")?)?,
    })
}

/// Durable, single-node [`IdentityStore`] backed by `SQLite` in WAL mode.
/// The connection is guarded by a `std::sync::Mutex` and every operation
/// runs on a blocking task, keeping the async runtime's worker threads free
/// of synchronous I/O.
#[derive(Clone)]
pub struct SqliteIdentityStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteIdentityStore {
    /// Opens (or creates) the database at `path` and applies the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the file cannot be opened or the
    /// schema cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteStoreError> {
        let connection = Connection::open(path)?;
        connection.pragma_update(None, "journal_mode", "WAL")?;
        connection.pragma_update(None, "foreign_keys", "ON")?;
        schema::initialize(&connection)?;
        Ok(Self { connection: Arc::new(Mutex::new(connection)) })
    }

    /// Opens an in-memory database, for tests.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the schema cannot be created.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let connection = Connection::open_in_memory()?;
        schema::initialize(&connection)?;
        Ok(Self { connection: Arc::new(Mutex::new(connection)) })
    }

    async fn run<F, T>(&self, task: F) -> Result<T, HospitalError>
    where
        F: FnOnce(&Connection) -> Result<T, SqliteStoreError> + Send + 'static,
        T: Send + 'static,
    {
        let connection = self.connection.clone();
        tokio::task::spawn_blocking(move || {
            let guard = connection.lock().unwrap_or_else(|poisoned| {
                tracing::warn!("sqlite identity store connection mutex was poisoned, recovering");
                poisoned.into_inner()
            });
            task(&guard)
        })
        .await
        .map_err(SqliteStoreError::from)?
        .map_err(HospitalError::from)
    }
}

#[async_trait]
impl IdentityStore for SqliteIdentityStore {
    async fn register(&self, user: User) -> Result<User, HospitalError> {
        self.run(move |connection| {
            connection.execute(
                "INSERT INTO users (id, tenant_id, name, email, password_hash, phone, active,
                    email_verified, failed_attempts, locked_until, last_login_at,
                    password_changed_at, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    user.id.as_str(),
                    user.tenant_id.as_str(),
                    user.name,
                    user.email,
                    user.password_hash,
                    user.phone,
                    i64::from(user.active),
                    i64::from(user.email_verified),
                    i64::from(user.failed_attempts),
                    user.locked_until.map(to_rfc3339).transpose()?,
                    user.last_login_at.map(to_rfc3339).transpose()?,
                    to_rfc3339(user.password_changed_at)?,
                    to_rfc3339(user.created_at)?,
                    to_rfc3339(user.updated_at)?,
                ],
            )?;
            Ok(user)
        })
        .await
    }

    async fn find_by_email(&self, tenant_id: &TenantId, email: &str) -> Result<Option<User>, HospitalError> {
        let tenant_id = tenant_id.clone();
        let email = email.to_string();
        self.run(move |connection| {
            connection
                .query_row(
                    "SELECT * FROM users WHERE tenant_id = ?1 AND lower(email) = lower(?2)",
                    params![tenant_id.as_str(), email],
                    row_to_user,
                )
                .optional()
                .map_err(SqliteStoreError::from)
        })
        .await
    }

    async fn find_by_id_in_tenant(&self, tenant_id: &TenantId, user_id: &UserId) -> Result<Option<User>, HospitalError> {
        let tenant_id = tenant_id.clone();
        let user_id = user_id.clone();
        self.run(move |connection| {
            connection
                .query_row(
                    "SELECT * FROM users WHERE tenant_id = ?1 AND id = ?2",
                    params![tenant_id.as_str(), user_id.as_str()],
                    row_to_user,
                )
                .optional()
                .map_err(SqliteStoreError::from)
        })
        .await
    }

    async fn save(&self, user: User) -> Result<User, HospitalError> {
        self.run(move |connection| {
            let updated = connection.execute(
                "UPDATE users SET name = ?1, email = ?2, password_hash = ?3, phone = ?4, active = ?5,
                    email_verified = ?6, failed_attempts = ?7, locked_until = ?8, last_login_at = ?9,
                    password_changed_at = ?10, updated_at = ?11
                 WHERE tenant_id = ?12 AND id = ?13",
                params![
                    user.name,
                    user.email,
                    user.password_hash,
                    user.phone,
                    i64::from(user.active),
                    i64::from(user.email_verified),
                    i64::from(user.failed_attempts),
                    user.locked_until.map(to_rfc3339).transpose()?,
                    user.last_login_at.map(to_rfc3339).transpose()?,
                    to_rfc3339(user.password_changed_at)?,
                    to_rfc3339(user.updated_at)?,
                    user.tenant_id.as_str(),
                    user.id.as_str(),
                ],
            )?;
            if updated == 0 {
                return Err(SqliteStoreError::Conflict(format!("user {} not found", user.id)));
            }
            Ok(user)
        })
        .await
    }

    async fn soft_delete(&self, tenant_id: &TenantId, user_id: &UserId) -> Result<(), HospitalError> {
        self.set_active(tenant_id, user_id, false).await
    }

    async fn reactivate(&self, tenant_id: &TenantId, user_id: &UserId) -> Result<(), HospitalError> {
        self.set_active(tenant_id, user_id, true).await
    }
}

impl SqliteIdentityStore {
    async fn set_active(&self, tenant_id: &TenantId, user_id: &UserId, active: bool) -> Result<(), HospitalError> {
        let tenant_id = tenant_id.clone();
        let user_id = user_id.clone();
        self.run(move |connection| {
            let updated = connection.execute(
                "UPDATE users SET active = ?1 WHERE tenant_id = ?2 AND id = ?3",
                params![i64::from(active), tenant_id.as_str(), user_id.as_str()],
            )?;
            if updated == 0 {
                return Err(SqliteStoreError::Conflict(format!("user {user_id} not found")));
            }
            Ok(())
        })
        .await
        .map_err(|error| match error {
            HospitalError::Conflict(message) => HospitalError::NotFound(message),
            other => other,
        })
    }
}
