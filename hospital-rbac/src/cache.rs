// hospital-rbac/src/cache.rs
// ============================================================================
// Module: Permission Cache
// Description: Short-lived per-tenant, per-user cache of effective grants,
// invalidated eagerly on RBAC table writes.
// Dependencies: dashmap
// ============================================================================

use std::time::{Duration, Instant};

use dashmap::DashMap;
use hospital_core::ids::TenantId;

use crate::store::EffectiveGrants;

#[derive(Debug, Clone, Hash, PartialEq, Eq)]
struct CacheKey {
    tenant_id: TenantId,
    user_id: String,
}

struct Entry {
    grants: EffectiveGrants,
    inserted_at: Instant,
}

/// Caches [`EffectiveGrants`] per `(tenant, user)` for a short TTL. Callers
/// must invalidate on any write to `UserRole`/`RolePermission`/
/// `UserResourcePermission`; this cache never self-refreshes eagerly, it
/// only expires.
pub struct PermissionCache {
    entries: DashMap<CacheKey, Entry>,
    ttl: Duration,
}

impl PermissionCache {
    /// Builds a cache with the given time-to-live for each entry.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Returns the cached grants for `(tenant, user)` if present and not
    /// expired.
    #[must_use]
    pub fn get(&self, tenant_id: &TenantId, user_id: &str) -> Option<EffectiveGrants> {
        let key = CacheKey {
            tenant_id: tenant_id.clone(),
            user_id: user_id.to_string(),
        };
        let entry = self.entries.get(&key)?;
        if entry.inserted_at.elapsed() > self.ttl {
            drop(entry);
            self.entries.remove(&key);
            return None;
        }
        Some(entry.grants.clone())
    }

    /// Inserts or replaces the cached grants for `(tenant, user)`.
    pub fn put(&self, tenant_id: &TenantId, user_id: &str, grants: EffectiveGrants) {
        let key = CacheKey {
            tenant_id: tenant_id.clone(),
            user_id: user_id.to_string(),
        };
        self.entries.insert(
            key,
            Entry {
                grants,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Invalidates the cached grants for a single `(tenant, user)`, called
    /// whenever that user's roles or permissions change.
    pub fn invalidate(&self, tenant_id: &TenantId, user_id: &str) {
        self.entries.remove(&CacheKey {
            tenant_id: tenant_id.clone(),
            user_id: user_id.to_string(),
        });
    }

    /// Invalidates every cached entry for a tenant, used when a role's
    /// permission set changes (affecting every holder of that role).
    pub fn invalidate_tenant(&self, tenant_id: &TenantId) {
        self.entries.retain(|key, _| &key.tenant_id != tenant_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread::sleep;

    fn grants(perm: &str) -> EffectiveGrants {
        let mut permissions = HashSet::new();
        permissions.insert(perm.to_string());
        EffectiveGrants {
            roles: HashSet::new(),
            permissions,
        }
    }

    #[test]
    fn returns_cached_entry_within_ttl() {
        let cache = PermissionCache::new(Duration::from_secs(60));
        let tenant = TenantId::new("t1");
        cache.put(&tenant, "u1", grants("patient:read"));
        assert!(cache.get(&tenant, "u1").is_some());
    }

    #[test]
    fn expires_entries_past_ttl() {
        let cache = PermissionCache::new(Duration::from_millis(10));
        let tenant = TenantId::new("t1");
        cache.put(&tenant, "u1", grants("patient:read"));
        sleep(Duration::from_millis(30));
        assert!(cache.get(&tenant, "u1").is_none());
    }

    #[test]
    fn invalidate_removes_a_single_user() {
        let cache = PermissionCache::new(Duration::from_secs(60));
        let tenant = TenantId::new("t1");
        cache.put(&tenant, "u1", grants("patient:read"));
        cache.put(&tenant, "u2", grants("patient:read"));
        cache.invalidate(&tenant, "u1");
        assert!(cache.get(&tenant, "u1").is_none());
        assert!(cache.get(&tenant, "u2").is_some());
    }

    #[test]
    fn invalidate_tenant_clears_every_user_in_that_tenant() {
        let cache = PermissionCache::new(Duration::from_secs(60));
        let tenant_a = TenantId::new("t1");
        let tenant_b = TenantId::new("t2");
        cache.put(&tenant_a, "u1", grants("patient:read"));
        cache.put(&tenant_b, "u1", grants("patient:read"));
        cache.invalidate_tenant(&tenant_a);
        assert!(cache.get(&tenant_a, "u1").is_none());
        assert!(cache.get(&tenant_b, "u1").is_some());
    }
}
