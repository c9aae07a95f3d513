// hospital-rbac/src/resolver.rs
// ============================================================================
// Module: Permission Resolver
// Description: Implements the hasPermission/canAccess resolution order on
// top of a `RoleStore` (optionally cached).
// Dependencies: hospital-core, tracing
// ============================================================================

use std::sync::Arc;

use hospital_core::ids::TenantId;
use hospital_core::HospitalError;

use crate::model::Permission;
use crate::store::RoleStore;

/// The system roles with dedicated convenience predicates.
const ADMIN_ROLE: &str = "admin";
const DOCTOR_ROLE: &str = "doctor";
const NURSE_ROLE: &str = "nurse";
const PATIENT_ROLE: &str = "patient";

/// Result of [`Resolver::list_accessible_resources`]: either "allow all" (the
/// user holds a type-wide permission) or an explicit enumerated set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessList {
    AllowAll,
    Ids(Vec<String>),
}

/// A snapshot of the token's own claims, consulted before falling back to a
/// store lookup (resolution order step 1).
#[derive(Debug, Clone, Default)]
pub struct TokenClaims {
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

/// Resolves effective permissions and role membership for a (tenant, user),
/// implementing the order: token claims, then a joined role/permission
/// lookup, then (for resource-scoped checks) a per-object grant.
pub struct Resolver {
    store: Arc<dyn RoleStore>,
}

impl Resolver {
    /// Builds a resolver over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RoleStore>) -> Self {
        Self { store }
    }

    /// Returns true when `name` is present either in the token's own
    /// `permissions[]` claim or in the store-resolved effective set.
    ///
    /// # Errors
    ///
    /// Propagates [`HospitalError`] from the underlying store lookup.
    pub async fn has_permission(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        claims: &TokenClaims,
        name: &str,
    ) -> Result<bool, HospitalError> {
        if claims.permissions.iter().any(|p| p == name) {
            return Ok(true);
        }
        let grants = self
            .store
            .roles_with_permissions_for_user(tenant_id, user_id)
            .await?;
        Ok(grants.permissions.contains(name))
    }

    /// `hasPermission`, signalling [`HospitalError::Forbidden`] on failure.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when the permission is absent, or propagates a
    /// store error.
    pub async fn require_permission(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        claims: &TokenClaims,
        name: &str,
    ) -> Result<(), HospitalError> {
        if self.has_permission(tenant_id, user_id, claims, name).await? {
            Ok(())
        } else {
            tracing::warn!(tenant_id = %tenant_id, user_id, permission = name, "permission denied");
            Err(HospitalError::Forbidden(format!("missing permission {name}")))
        }
    }

    /// Signals [`HospitalError::Forbidden`] unless the token or store-resolved
    /// roles include `role`.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` when the role is absent, or propagates a store
    /// error.
    pub async fn require_role(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        claims: &TokenClaims,
        role: &str,
    ) -> Result<(), HospitalError> {
        if claims.roles.iter().any(|r| r == role) {
            return Ok(());
        }
        let grants = self
            .store
            .roles_with_permissions_for_user(tenant_id, user_id)
            .await?;
        if grants.roles.contains(role) {
            Ok(())
        } else {
            tracing::warn!(tenant_id = %tenant_id, user_id, role, "role requirement not met");
            Err(HospitalError::Forbidden(format!("missing role {role}")))
        }
    }

    /// Resource-scoped access: first tests the type-wide permission, then
    /// falls back to an exact per-object grant.
    ///
    /// # Errors
    ///
    /// Propagates [`HospitalError`] from the underlying store lookups.
    pub async fn can_access(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        claims: &TokenClaims,
        resource_type: &str,
        resource_id: &str,
        action: &str,
    ) -> Result<bool, HospitalError> {
        let type_wide = Permission::name_for(resource_type, action);
        if self.has_permission(tenant_id, user_id, claims, &type_wide).await? {
            return Ok(true);
        }
        let grant = self
            .store
            .find_resource_permission(tenant_id, user_id, resource_type, resource_id, action)
            .await?;
        Ok(grant.is_some())
    }

    /// `resourceType+":"+action` allow-all or enumerated set.
    ///
    /// # Errors
    ///
    /// Propagates [`HospitalError`] from the underlying store lookups.
    pub async fn list_accessible_resources(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        claims: &TokenClaims,
        resource_type: &str,
        action: &str,
    ) -> Result<AccessList, HospitalError> {
        let type_wide = Permission::name_for(resource_type, action);
        if self.has_permission(tenant_id, user_id, claims, &type_wide).await? {
            return Ok(AccessList::AllowAll);
        }
        let ids = self
            .store
            .resource_ids_with_grant(tenant_id, user_id, resource_type, action)
            .await?;
        Ok(AccessList::Ids(ids))
    }

    /// Returns true when the token or store-resolved roles include `"admin"`.
    ///
    /// # Errors
    ///
    /// Propagates [`HospitalError`] from the underlying store lookup.
    pub async fn is_admin(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        claims: &TokenClaims,
    ) -> Result<bool, HospitalError> {
        self.has_role(tenant_id, user_id, claims, ADMIN_ROLE).await
    }

    /// Returns true when the token or store-resolved roles include
    /// `"doctor"`.
    ///
    /// # Errors
    ///
    /// Propagates [`HospitalError`] from the underlying store lookup.
    pub async fn is_doctor(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        claims: &TokenClaims,
    ) -> Result<bool, HospitalError> {
        self.has_role(tenant_id, user_id, claims, DOCTOR_ROLE).await
    }

    /// Returns true when the token or store-resolved roles include `"nurse"`.
    ///
    /// # Errors
    ///
    /// Propagates [`HospitalError`] from the underlying store lookup.
    pub async fn is_nurse(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        claims: &TokenClaims,
    ) -> Result<bool, HospitalError> {
        self.has_role(tenant_id, user_id, claims, NURSE_ROLE).await
    }

    /// Returns true when the token or store-resolved roles include
    /// `"patient"`.
    ///
    /// # Errors
    ///
    /// Propagates [`HospitalError`] from the underlying store lookup.
    pub async fn is_patient(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        claims: &TokenClaims,
    ) -> Result<bool, HospitalError> {
        self.has_role(tenant_id, user_id, claims, PATIENT_ROLE).await
    }

    async fn has_role(
        &self,
        tenant_id: &TenantId,
        user_id: &str,
        claims: &TokenClaims,
        role: &str,
    ) -> Result<bool, HospitalError> {
        if claims.roles.iter().any(|r| r == role) {
            return Ok(true);
        }
        let grants = self
            .store
            .roles_with_permissions_for_user(tenant_id, user_id)
            .await?;
        Ok(grants.roles.contains(role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UserResourcePermission;
    use crate::store::EffectiveGrants;
    use async_trait::async_trait;
    use std::collections::HashSet;

    struct StubStore {
        grants: EffectiveGrants,
        resource_grant: Option<UserResourcePermission>,
    }

    #[async_trait]
    impl RoleStore for StubStore {
        async fn roles_with_permissions_for_user(
            &self,
            _tenant_id: &TenantId,
            _user_id: &str,
        ) -> Result<EffectiveGrants, HospitalError> {
            Ok(self.grants.clone())
        }

        async fn find_resource_permission(
            &self,
            _tenant_id: &TenantId,
            _user_id: &str,
            _resource: &str,
            _resource_id: &str,
            _action: &str,
        ) -> Result<Option<UserResourcePermission>, HospitalError> {
            Ok(self.resource_grant.clone())
        }

        async fn resource_ids_with_grant(
            &self,
            _tenant_id: &TenantId,
            _user_id: &str,
            _resource: &str,
            _action: &str,
        ) -> Result<Vec<String>, HospitalError> {
            Ok(self
                .resource_grant
                .as_ref()
                .map(|g| vec![g.resource_id.clone()])
                .unwrap_or_default())
        }
    }

    fn tenant() -> TenantId {
        TenantId::new("t1")
    }

    #[tokio::test]
    async fn token_claims_short_circuit_the_store_lookup() {
        let resolver = Resolver::new(Arc::new(StubStore {
            grants: EffectiveGrants::default(),
            resource_grant: None,
        }));
        let claims = TokenClaims {
            roles: vec![],
            permissions: vec!["patient:read".to_string()],
        };
        assert!(resolver
            .has_permission(&tenant(), "u1", &claims, "patient:read")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn falls_back_to_joined_store_lookup() {
        let mut permissions = HashSet::new();
        permissions.insert("patient:read".to_string());
        let resolver = Resolver::new(Arc::new(StubStore {
            grants: EffectiveGrants {
                roles: HashSet::new(),
                permissions,
            },
            resource_grant: None,
        }));
        let claims = TokenClaims::default();
        assert!(resolver
            .has_permission(&tenant(), "u1", &claims, "patient:read")
            .await
            .unwrap());
        assert!(!resolver
            .has_permission(&tenant(), "u1", &claims, "patient:write")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn require_permission_signals_forbidden() {
        let resolver = Resolver::new(Arc::new(StubStore {
            grants: EffectiveGrants::default(),
            resource_grant: None,
        }));
        let claims = TokenClaims::default();
        let err = resolver
            .require_permission(&tenant(), "u1", &claims, "patient:read")
            .await
            .unwrap_err();
        assert!(matches!(err, HospitalError::Forbidden(_)));
    }

    #[tokio::test]
    async fn can_access_falls_back_to_resource_grant() {
        let resolver = Resolver::new(Arc::new(StubStore {
            grants: EffectiveGrants::default(),
            resource_grant: Some(UserResourcePermission {
                user_id: "u1".to_string(),
                tenant_id: tenant(),
                resource: "patient".to_string(),
                resource_id: "p-42".to_string(),
                action: "read".to_string(),
            }),
        }));
        let claims = TokenClaims::default();
        assert!(resolver
            .can_access(&tenant(), "u1", &claims, "patient", "p-42", "read")
            .await
            .unwrap());
        assert!(!resolver
            .can_access(&tenant(), "u1", &claims, "patient", "p-99", "read")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn list_accessible_resources_reports_allow_all_when_type_wide() {
        let mut permissions = HashSet::new();
        permissions.insert("patient:read".to_string());
        let resolver = Resolver::new(Arc::new(StubStore {
            grants: EffectiveGrants {
                roles: HashSet::new(),
                permissions,
            },
            resource_grant: None,
        }));
        let claims = TokenClaims::default();
        let result = resolver
            .list_accessible_resources(&tenant(), "u1", &claims, "patient", "read")
            .await
            .unwrap();
        assert_eq!(result, AccessList::AllowAll);
    }

    #[tokio::test]
    async fn is_doctor_checks_store_resolved_roles() {
        let mut roles = HashSet::new();
        roles.insert(DOCTOR_ROLE.to_string());
        let resolver = Resolver::new(Arc::new(StubStore {
            grants: EffectiveGrants {
                roles,
                permissions: HashSet::new(),
            },
            resource_grant: None,
        }));
        let claims = TokenClaims::default();
        assert!(resolver.is_doctor(&tenant(), "u1", &claims).await.unwrap());
        assert!(!resolver.is_admin(&tenant(), "u1", &claims).await.unwrap());
    }
}
