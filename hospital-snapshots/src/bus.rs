// hospital-snapshots/src/bus.rs
// ============================================================================
// Module: Cache Invalidation Bus
// Description: Wraps C4 publication of `cache.invalidate` events after every
// snapshot change.
// Dependencies: hospital-core, hospital-events
// ============================================================================

use std::sync::Arc;

use hospital_core::{EventEnvelope, EventType, TenantId};
use hospital_events::Publisher;
use time::OffsetDateTime;

use crate::model::CacheInvalidatePayload;

/// Publishes `cache.invalidate` events, consumed by any service holding a
/// cache named in `cacheNames` (the appointment read cache, the RBAC
/// permission cache).
pub struct CacheInvalidationBus {
    publisher: Arc<dyn Publisher>,
}

impl CacheInvalidationBus {
    /// Builds a bus over the given publisher.
    #[must_use]
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self { publisher }
    }

    /// Invalidates a single entity id across the named caches, within the
    /// given tenant.
    pub async fn invalidate_entity(&self, tenant_id: &TenantId, cache_names: &[&str], entity_id: &str) {
        let payload = CacheInvalidatePayload {
            cache_names: cache_names.iter().map(|name| (*name).to_string()).collect(),
            entity_ids: vec![entity_id.to_string()],
            invalidate_all: false,
        };
        self.publish(tenant_id, payload).await;
    }

    /// Flushes every entry in the named caches for a tenant-wide reset.
    pub async fn invalidate_all(&self, tenant_id: &TenantId, cache_names: &[&str]) {
        let payload = CacheInvalidatePayload {
            cache_names: cache_names.iter().map(|name| (*name).to_string()).collect(),
            entity_ids: Vec::new(),
            invalidate_all: true,
        };
        self.publish(tenant_id, payload).await;
    }

    async fn publish(&self, tenant_id: &TenantId, payload: CacheInvalidatePayload) {
        let Ok(payload_json) = serde_json::to_value(&payload) else {
            tracing::error!("failed to serialize cache invalidation payload");
            return;
        };
        let envelope = EventEnvelope::new(
            EventType::CacheInvalidate,
            OffsetDateTime::now_utc(),
            tenant_id.clone(),
            payload_json,
        );
        if self.publisher.publish(envelope).await.is_err() {
            tracing::error!("failed to publish cache invalidation event");
        }
    }
}
