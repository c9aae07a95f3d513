// hospital-identity/src/store.rs
// ============================================================================
// Module: Identity Store Trait
// Description: Tenant-scoped persistence boundary for users.
// Dependencies: async-trait, hospital-core
// ============================================================================

use async_trait::async_trait;
use hospital_core::ids::{TenantId, UserId};
use hospital_core::HospitalError;

use crate::User;

/// Storage boundary for user records, implemented in-memory by
/// [`crate::MemoryIdentityStore`] and durably by `hospital-store-sqlite`.
///
/// Every lookup is scoped to a tenant: `(tenant_id, email)` is the natural
/// key, never `email` alone.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Registers a new user. Fails with [`HospitalError::Conflict`] when the
    /// `(tenant_id, email)` pair already exists.
    async fn register(&self, user: User) -> Result<User, HospitalError>;

    /// Finds a user by tenant and email, the login lookup key.
    async fn find_by_email(
        &self,
        tenant_id: &TenantId,
        email: &str,
    ) -> Result<Option<User>, HospitalError>;

    /// Finds a user by id, scoped to a tenant so cross-tenant ids never leak.
    async fn find_by_id_in_tenant(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> Result<Option<User>, HospitalError>;

    /// Persists an already-mutated user record (e.g. after a lockout
    /// transition or a successful login).
    async fn save(&self, user: User) -> Result<User, HospitalError>;

    /// Soft-deletes a user by clearing `active`. Returns `NotFound` when the
    /// user does not exist in the tenant.
    async fn soft_delete(&self, tenant_id: &TenantId, user_id: &UserId) -> Result<(), HospitalError>;

    /// Reactivates a previously soft-deleted user.
    async fn reactivate(&self, tenant_id: &TenantId, user_id: &UserId) -> Result<(), HospitalError>;
}
