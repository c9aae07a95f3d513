// hospital-audit/src/store.rs
// ============================================================================
// Module: Audit Store
// Description: Persistence boundary enforcing the eventId uniqueness
// invariant via upsert-on-conflict.
// Dependencies: async-trait, dashmap, hospital-core
// ============================================================================

use async_trait::async_trait;
use dashmap::DashMap;
use hospital_core::ids::TenantId;
use hospital_core::HospitalError;
use uuid::Uuid;

use crate::model::AuditEntry;

/// Storage boundary for the audit journal, implemented in-memory by
/// [`InMemoryAuditStore`] and, durably, by `hospital-store-sqlite`.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Appends an entry. If an entry with the same `event_id` already
    /// exists, this is a no-op (replay safety); the existing entry is
    /// returned either way.
    async fn append(&self, entry: AuditEntry) -> Result<AuditEntry, HospitalError>;

    /// Fetches a single entry by its own id.
    async fn get(&self, tenant_id: &TenantId, id: Uuid) -> Result<Option<AuditEntry>, HospitalError>;

    /// Lists entries for a user within a tenant, newest first.
    async fn list_by_user(&self, tenant_id: &TenantId, user_id: &str) -> Result<Vec<AuditEntry>, HospitalError>;

    /// Lists entries for a resource within a tenant, newest first.
    async fn list_by_resource(
        &self,
        tenant_id: &TenantId,
        resource_type: &str,
        resource_id: &str,
    ) -> Result<Vec<AuditEntry>, HospitalError>;

    /// Returns true when an entry for `event_id` has already been journaled.
    async fn contains_event(&self, event_id: Uuid) -> Result<bool, HospitalError>;
}

/// `DashMap`-backed journal keyed by `event_id`, the idempotency key itself.
#[derive(Default)]
pub struct InMemoryAuditStore {
    rows: DashMap<Uuid, AuditEntry>,
}

impl InMemoryAuditStore {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn append(&self, entry: AuditEntry) -> Result<AuditEntry, HospitalError> {
        let existing = self.rows.entry(entry.event_id).or_insert_with(|| entry.clone());
        Ok(existing.value().clone())
    }

    async fn get(&self, tenant_id: &TenantId, id: Uuid) -> Result<Option<AuditEntry>, HospitalError> {
        Ok(self
            .rows
            .iter()
            .find(|row| &row.tenant_id == tenant_id && row.id == id)
            .map(|row| row.value().clone()))
    }

    async fn list_by_user(&self, tenant_id: &TenantId, user_id: &str) -> Result<Vec<AuditEntry>, HospitalError> {
        let mut rows: Vec<AuditEntry> = self
            .rows
            .iter()
            .filter(|row| &row.tenant_id == tenant_id && row.user_id.as_deref() == Some(user_id))
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(rows)
    }

    async fn list_by_resource(
        &self,
        tenant_id: &TenantId,
        resource_type: &str,
        resource_id: &str,
    ) -> Result<Vec<AuditEntry>, HospitalError> {
        let mut rows: Vec<AuditEntry> = self
            .rows
            .iter()
            .filter(|row| {
                &row.tenant_id == tenant_id
                    && row.resource_type == resource_type
                    && row.resource_id.as_deref() == Some(resource_id)
            })
            .map(|row| row.value().clone())
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(rows)
    }

    async fn contains_event(&self, event_id: Uuid) -> Result<bool, HospitalError> {
        Ok(self.rows.contains_key(&event_id))
    }
}
