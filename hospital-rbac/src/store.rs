// hospital-rbac/src/store.rs
// ============================================================================
// Module: Role Store Trait
// Description: The joined-lookup boundary RBAC resolution depends on.
// Dependencies: async-trait, hospital-core
// ============================================================================

use std::collections::HashSet;

use async_trait::async_trait;
use hospital_core::ids::TenantId;
use hospital_core::HospitalError;

use crate::model::UserResourcePermission;

/// The role names and union of permission names a user currently holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveGrants {
    pub roles: HashSet<String>,
    pub permissions: HashSet<String>,
}

/// Storage boundary for role/permission resolution.
///
/// `roles_with_permissions_for_user` is deliberately a single joined lookup:
/// implementations must not resolve roles and then permissions in a second
/// round trip per role, which is the N+1 pattern the resolution order
/// explicitly forbids.
#[async_trait]
pub trait RoleStore: Send + Sync {
    /// Resolves a user's currently-valid roles and their union of
    /// permissions in one joined lookup.
    async fn roles_with_permissions_for_user(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
    ) -> Result<EffectiveGrants, HospitalError>;

    /// Finds a matching per-object grant, if one exists.
    async fn find_resource_permission(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        resource: &str,
        resource_id: &str,
        action: &str,
    ) -> Result<Option<UserResourcePermission>, HospitalError>;

    /// Lists the resource ids a user holds an explicit grant for on
    /// `(resource, action)`, for [`crate::Resolver::list_accessible_resources`].
    async fn resource_ids_with_grant(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        resource: &str,
        action: &str,
    ) -> Result<Vec<String>, HospitalError>;
}
