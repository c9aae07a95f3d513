// hospital-identity/src/memory.rs
// ============================================================================
// Module: In-memory Identity Store
// Description: DashMap-backed default `IdentityStore` implementation.
// Dependencies: async-trait, dashmap, hospital-core
// ============================================================================

use async_trait::async_trait;
use dashmap::DashMap;
use hospital_core::ids::{TenantId, UserId};
use hospital_core::HospitalError;

use crate::store::IdentityStore;
use crate::User;

/// In-process, concurrent `IdentityStore`. Keyed by user id; email lookups
/// scan the tenant's users, which is fine at the scale this reference
/// implementation targets (a durable index-backed store lives in
/// `hospital-store-sqlite`).
#[derive(Debug, Default)]
pub struct MemoryIdentityStore {
    users: DashMap<UserId, User>,
}

impl MemoryIdentityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn email_taken(&self, tenant_id: &TenantId, email: &str) -> bool {
        self.users
            .iter()
            .any(|entry| &entry.tenant_id == tenant_id && entry.email.eq_ignore_ascii_case(email))
    }
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn register(&self, user: User) -> Result<User, HospitalError> {
        if self.email_taken(&user.tenant_id, &user.email) {
            return Err(HospitalError::Conflict(format!(
                "email {} is already registered for this tenant",
                user.email
            )));
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_email(
        &self,
        tenant_id: &TenantId,
        email: &str,
    ) -> Result<Option<User>, HospitalError> {
        Ok(self
            .users
            .iter()
            .find(|entry| &entry.tenant_id == tenant_id && entry.email.eq_ignore_ascii_case(email))
            .map(|entry| entry.value().clone()))
    }

    async fn find_by_id_in_tenant(
        &self,
        tenant_id: &TenantId,
        user_id: &UserId,
    ) -> Result<Option<User>, HospitalError> {
        Ok(self
            .users
            .get(user_id)
            .filter(|entry| &entry.tenant_id == tenant_id)
            .map(|entry| entry.value().clone()))
    }

    async fn save(&self, user: User) -> Result<User, HospitalError> {
        if !self.users.contains_key(&user.id) {
            return Err(HospitalError::NotFound(format!("user {} not found", user.id)));
        }
        self.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn soft_delete(&self, tenant_id: &TenantId, user_id: &UserId) -> Result<(), HospitalError> {
        let mut entry = self
            .users
            .get_mut(user_id)
            .filter(|entry| &entry.tenant_id == tenant_id)
            .ok_or_else(|| HospitalError::NotFound(format!("user {user_id} not found")))?;
        entry.active = false;
        Ok(())
    }

    async fn reactivate(&self, tenant_id: &TenantId, user_id: &UserId) -> Result<(), HospitalError> {
        let mut entry = self
            .users
            .get_mut(user_id)
            .filter(|entry| &entry.tenant_id == tenant_id)
            .ok_or_else(|| HospitalError::NotFound(format!("user {user_id} not found")))?;
        entry.active = true;
        Ok(())
    }
}
