// hospital-rbac/src/model.rs
// ============================================================================
// Module: RBAC Entities
// Description: Roles, permissions, and the assignment/grant rows joining
// them to users.
// Dependencies: hospital-core, serde, time
// ============================================================================

use hospital_core::ids::TenantId;
use hospital_core::Clock;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A tenant-scoped role, e.g. `"doctor"` or `"front-desk"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub tenant_id: TenantId,
    pub name: String,
    pub is_system_role: bool,
    pub active: bool,
}

/// A global permission, named `"<resource>:<action>"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub name: String,
    pub resource: String,
    pub action: String,
    pub is_system_permission: bool,
}

impl Permission {
    /// Builds the canonical `"<resource>:<action>"` name.
    #[must_use]
    pub fn name_for(resource: &str, action: &str) -> String {
        format!("{resource}:{action}")
    }
}

/// A role-to-permission grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RolePermission {
    pub role_id: String,
    pub permission_id: String,
}

/// A user's assignment to a role within a tenant, optionally time-bounded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRole {
    pub id: String,
    pub user_id: String,
    pub role_id: String,
    pub tenant_id: TenantId,
    pub department: Option<String>,
    pub assigned_by: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub valid_from: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub valid_until: Option<OffsetDateTime>,
    pub active: bool,
}

impl UserRole {
    /// A user-role assignment is valid iff `active AND (validFrom <= now OR
    /// null) AND (validUntil > now OR null)`.
    #[must_use]
    pub fn is_valid(&self, clock: &dyn Clock) -> bool {
        if !self.active {
            return false;
        }
        let now = clock.now();
        let from_ok = self.valid_from.map_or(true, |from| from <= now);
        let until_ok = self.valid_until.map_or(true, |until| until > now);
        from_ok && until_ok
    }
}

/// A per-object grant supplementing role-based permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResourcePermission {
    pub user_id: String,
    pub tenant_id: TenantId,
    pub resource: String,
    pub resource_id: String,
    pub action: String,
}
