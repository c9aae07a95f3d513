// hospital-store-sqlite/src/audit.rs
// ============================================================================
// Module: SQLite Audit Store
// Description: Durable AuditStore implementation enforcing the eventId
// uniqueness invariant via INSERT ... ON CONFLICT DO NOTHING.
// Dependencies: async-trait, hospital-audit, hospital-core, rusqlite, time,
// tokio
// ============================================================================

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hospital_audit::{AuditEntry, AuditStore};
use hospital_core::ids::TenantId;
use hospital_core::HospitalError;
use rusqlite::{Connection, OptionalExtension, Row, params};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::SqliteStoreError;
use crate::schema;

fn to_rfc3339(value: OffsetDateTime) -> Result<String, SqliteStoreError> {
    value.format(&Rfc3339).map_err(|error| SqliteStoreError::Db(error.to_string()))
}

fn from_rfc3339(value: &str) -> rusqlite::Result<OffsetDateTime> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(error)))
}

fn to_json(value: &Option<serde_json::Value>) -> Option<String> {
    value.as_ref().map(serde_json::Value::to_string)
}

fn from_json(value: Option<String>) -> Option<serde_json::Value> {
    value.and_then(|text| serde_json::from_str(&text).ok())
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<AuditEntry> {
    let old_value: Option<String> = row.get("old_value")?;
    let new_value: Option<String> = row.get("new_value")?;
    Ok(AuditEntry {
        id: Uuid::parse_str(&row.get::<_, String>("id")?)
            .map_err(|error| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(error)))?,
        tenant_id: TenantId::new(row.get::<_, String>("tenant_id")?),
        user_id: row.get("user_id")?,
        user_email: row.get("user_email")?,
        action: row.get("action")?,
        resource_type: row.get("resource_type")?,
        resource_id: row.get("resource_id")?,
        description: row.get("description")?,
        old_value: from_json(old_value),
        new_value: from_json(new_value),
        ip: row.get("ip")?,
        agent: row.get("agent")?,
        event_id: Uuid::parse_str(&row.get::<_, String>("event_id")?)
            .map_err(|error| rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(error)))?,
        timestamp: from_rfc3339(&row.get::<_, String>("timestamp")?)?,
    })
}

/// Durable, single-node [`AuditStore`] backed by `SQLite`. `event_id`
/// uniqueness is enforced by the schema; a redelivered event upserts
/// nothing and the original row is returned.
#[derive(Clone)]
pub struct SqliteAuditStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteAuditStore {
    /// Opens (or creates) the database at `path` and applies the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the file cannot be opened or the
    /// schema cannot be created.
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, SqliteStoreError> {
        let connection = Connection::open(path)?;
        connection.pragma_update(None, "journal_mode", "WAL")?;
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
                tracing::warn!("sqlite audit store connection mutex was poisoned, recovering");
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
impl AuditStore for SqliteAuditStore {
    async fn append(&self, entry: AuditEntry) -> Result<AuditEntry, HospitalError> {
        let event_id = entry.event_id;
        self.run(move |connection| {
            connection.execute(
                "INSERT INTO audit_entries (id, tenant_id, user_id, user_email, action, resource_type,
                    resource_id, description, old_value, new_value, ip, agent, event_id, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                 ON CONFLICT(event_id) DO NOTHING",
                params![
                    entry.id.to_string(),
                    entry.tenant_id.as_str(),
                    entry.user_id,
                    entry.user_email,
                    entry.action,
                    entry.resource_type,
                    entry.resource_id,
                    entry.description,
                    to_json(&entry.old_value),
                    to_json(&entry.new_value),
                    entry.ip,
                    entry.agent,
                    event_id.to_string(),
                    to_rfc3339(entry.timestamp)?,
                ],
            )?;
            connection
                .query_row(
                    "SELECT * FROM audit_entries WHERE event_id = ?1",
                    params![event_id.to_string()],
                    row_to_entry,
                )
                .map_err(SqliteStoreError::from)
        })
        .await
    }

    async fn get(&self, tenant_id: &TenantId, id: Uuid) -> Result<Option<AuditEntry>, HospitalError> {
        let tenant_id = tenant_id.clone();
        self.run(move |connection| {
            connection
                .query_row(
                    "SELECT * FROM audit_entries WHERE tenant_id = ?1 AND id = ?2",
                    params![tenant_id.as_str(), id.to_string()],
                    row_to_entry,
                )
                .optional()
                .map_err(SqliteStoreError::from)
        })
        .await
    }

    async fn list_by_user(&self, tenant_id: &TenantId, user_id: &str) -> Result<Vec<AuditEntry>, HospitalError> {
        let tenant_id = tenant_id.clone();
        let user_id = user_id.to_string();
        self.run(move |connection| {
            let mut statement = connection.prepare(
                "SELECT * FROM audit_entries WHERE tenant_id = ?1 AND user_id = ?2 ORDER BY timestamp DESC",
            )?;
            let rows = statement
                .query_map(params![tenant_id.as_str(), user_id], row_to_entry)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    async fn list_by_resource(
        &self,
        tenant_id: &TenantId,
        resource_type: &str,
        resource_id: &str,
    ) -> Result<Vec<AuditEntry>, HospitalError> {
        let tenant_id = tenant_id.clone();
        let resource_type = resource_type.to_string();
        let resource_id = resource_id.to_string();
        self.run(move |connection| {
            let mut statement = connection.prepare(
                "SELECT * FROM audit_entries WHERE tenant_id = ?1 AND resource_type = ?2 AND resource_id = ?3
                 ORDER BY timestamp DESC",
            )?;
            let rows = statement
                .query_map(params![tenant_id.as_str(), resource_type, resource_id], row_to_entry)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    async fn contains_event(&self, event_id: Uuid) -> Result<bool, HospitalError> {
        self.run(move |connection| {
            let count: i64 = connection.query_row(
                "SELECT COUNT(*) FROM audit_entries WHERE event_id = ?1",
                params![event_id.to_string()],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(event_id: Uuid, user_id: &str) -> AuditEntry {
        AuditEntry {
            id: Uuid::new_v4(),
            tenant_id: TenantId::new("t1"),
            user_id: Some(user_id.to_string()),
            user_email: None,
            action: "CREATE".to_string(),
            resource_type: "PATIENT".to_string(),
            resource_id: Some("p1".to_string()),
            description: None,
            old_value: None,
            new_value: Some(serde_json::json!({"id": "p1"})),
            ip: None,
            agent: None,
            event_id,
            timestamp: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn appending_the_same_event_id_twice_keeps_the_first_entry() {
        let store = SqliteAuditStore::open_in_memory().unwrap();
        let event_id = Uuid::new_v4();
        let first = store.append(entry(event_id, "u1")).await.unwrap();
        let second = store.append(entry(event_id, "u2")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.user_id.as_deref(), Some("u1"));
    }

    #[tokio::test]
    async fn list_by_resource_round_trips_the_json_payload() {
        let store = SqliteAuditStore::open_in_memory().unwrap();
        store.append(entry(Uuid::new_v4(), "u1")).await.unwrap();

        let rows = store
            .list_by_resource(&TenantId::new("t1"), "PATIENT", "p1")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].new_value, Some(serde_json::json!({"id": "p1"})));
    }
}
