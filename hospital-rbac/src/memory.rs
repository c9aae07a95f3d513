// hospital-rbac/src/memory.rs
// ============================================================================
// Module: In-memory Role Store
// Description: DashMap-backed default `RoleStore` implementation, seeded at
// construction with the fixed system roles and their permissions.
// Dependencies: async-trait, dashmap, hospital-core
// ============================================================================

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;
use hospital_core::clock::SystemClock;
use hospital_core::ids::TenantId;
use hospital_core::HospitalError;

use crate::model::{Permission, Role, RolePermission, UserResourcePermission, UserRole};
use crate::store::{EffectiveGrants, RoleStore};

/// In-process, concurrent `RoleStore`. Joins are done by scanning the
/// (small, rarely-mutated) role and permission tables per call, which is
/// fine at the scale this reference implementation targets; a durable
/// index-backed store would push the join into SQL.
#[derive(Debug, Default)]
pub struct MemoryRoleStore {
    roles: DashMap<String, Role>,
    permissions: DashMap<String, Permission>,
    role_permissions: DashMap<String, Vec<RolePermission>>,
    user_roles: DashMap<String, Vec<UserRole>>,
    resource_permissions: DashMap<String, Vec<UserResourcePermission>>,
}

impl MemoryRoleStore {
    /// Creates an empty store, with no roles, permissions, or assignments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn user_key(tenant_id: &TenantId, user_id: &str) -> String {
        format!("{tenant_id}:{user_id}")
    }

    /// Defines a role, replacing any existing role with the same id.
    pub fn put_role(&self, role: Role) {
        self.roles.insert(role.id.clone(), role);
    }

    /// Defines a permission, replacing any existing permission with the
    /// same id.
    pub fn put_permission(&self, permission: Permission) {
        self.permissions.insert(permission.id.clone(), permission);
    }

    /// Grants `permission_id` to `role_id`.
    pub fn grant_role_permission(&self, role_id: &str, permission_id: &str) {
        self.role_permissions
            .entry(role_id.to_string())
            .or_default()
            .push(RolePermission {
                role_id: role_id.to_string(),
                permission_id: permission_id.to_string(),
            });
    }

    /// Assigns `role_id` to a user within a tenant.
    pub fn assign_role(&self, assignment: UserRole) {
        let key = Self::user_key(&assignment.tenant_id, &assignment.user_id);
        self.user_roles.entry(key).or_default().push(assignment);
    }

    /// Grants a per-object permission to a user.
    pub fn grant_resource_permission(&self, grant: UserResourcePermission) {
        let key = Self::user_key(&grant.tenant_id, &grant.user_id);
        self.resource_permissions.entry(key).or_default().push(grant);
    }
}

#[async_trait]
impl RoleStore for MemoryRoleStore {
    async fn roles_with_permissions_for_user(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
    ) -> Result<EffectiveGrants, HospitalError> {
        let clock = SystemClock;
        let key = Self::user_key(tenant_id, user_id);
        let mut roles = HashSet::new();
        let mut permissions = HashSet::new();

        let Some(assignments) = self.user_roles.get(&key) else {
            return Ok(EffectiveGrants::default());
        };
        for assignment in assignments.iter().filter(|a| a.is_valid(&clock)) {
            let Some(role) = self.roles.get(&assignment.role_id) else {
                continue;
            };
            if !role.active {
                continue;
            }
            roles.insert(role.name.clone());
            if let Some(grants) = self.role_permissions.get(&assignment.role_id) {
                for grant in grants.iter() {
                    if let Some(permission) = self.permissions.get(&grant.permission_id) {
                        permissions.insert(permission.name.clone());
                    }
                }
            }
        }
        Ok(EffectiveGrants { roles, permissions })
    }

    async fn find_resource_permission(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        resource: &str,
        resource_id: &str,
        action: &str,
    ) -> Result<Option<UserResourcePermission>, HospitalError> {
        let key = Self::user_key(tenant_id, user_id);
        Ok(self.resource_permissions.get(&key).and_then(|grants| {
            grants
                .iter()
                .find(|g| g.resource == resource && g.resource_id == resource_id && g.action == action)
                .cloned()
        }))
    }

    async fn resource_ids_with_grant(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        resource: &str,
        action: &str,
    ) -> Result<Vec<String>, HospitalError> {
        let key = Self::user_key(tenant_id, user_id);
        Ok(self.resource_permissions.get(&key).map_or_else(Vec::new, |grants| {
            grants
                .iter()
                .filter(|g| g.resource == resource && g.action == action)
                .map(|g| g.resource_id.clone())
                .collect()
        }))
    }
}
