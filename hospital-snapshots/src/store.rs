// hospital-snapshots/src/store.rs
// ============================================================================
// Module: Snapshot Store
// Description: Generic (tenant, origin-id)-keyed projection table,
// `DashMap`-backed. Tenant-scoped the same way `hospital-appointments`'
// `AppointmentStore` is, so two tenants reusing the same patient/doctor id
// never cross-match each other's facts.
// Dependencies: async-trait, dashmap, hospital-core
// ============================================================================

use async_trait::async_trait;
use dashmap::DashMap;
use hospital_core::ids::TenantId;

/// A last-write-wins projection table keyed by `(tenantId, origin id)`.
#[async_trait]
pub trait SnapshotStore<T>: Send + Sync
where
    T: Clone + Send + Sync,
{
    /// Returns the current snapshot for `id` within `tenant_id`, if any.
    async fn get(&self, tenant_id: &TenantId, id: &str) -> Option<T>;

    /// Inserts or replaces the snapshot for `(tenant_id, id)` unconditionally.
    async fn put(&self, tenant_id: &TenantId, id: String, value: T);

    /// Removes the snapshot for `(tenant_id, id)`, returning the prior value
    /// if present.
    async fn delete(&self, tenant_id: &TenantId, id: &str) -> Option<T>;

    /// Returns true when a snapshot exists for `(tenant_id, id)`.
    async fn contains(&self, tenant_id: &TenantId, id: &str) -> bool;
}

type RowKey = (TenantId, String);

/// `DashMap`-backed [`SnapshotStore`].
#[derive(Debug)]
pub struct DashMapSnapshotStore<T> {
    rows: DashMap<RowKey, T>,
}

impl<T> DashMapSnapshotStore<T> {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self { rows: DashMap::new() }
    }

    fn key(tenant_id: &TenantId, id: &str) -> RowKey {
        (tenant_id.clone(), id.to_string())
    }
}

impl<T> Default for DashMapSnapshotStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> SnapshotStore<T> for DashMapSnapshotStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn get(&self, tenant_id: &TenantId, id: &str) -> Option<T> {
        self.rows.get(&Self::key(tenant_id, id)).map(|entry| entry.value().clone())
    }

    async fn put(&self, tenant_id: &TenantId, id: String, value: T) {
        self.rows.insert(Self::key(tenant_id, &id), value);
    }

    async fn delete(&self, tenant_id: &TenantId, id: &str) -> Option<T> {
        self.rows.remove(&Self::key(tenant_id, id)).map(|(_, value)| value)
    }

    async fn contains(&self, tenant_id: &TenantId, id: &str) -> bool {
        self.rows.contains_key(&Self::key(tenant_id, id))
    }
}
