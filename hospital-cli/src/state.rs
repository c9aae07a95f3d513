// hospital-cli/src/state.rs
// ============================================================================
// Module: Domain State
// Description: Constructor-injected handles to every domain component the
// in-process auth/appointments/audit handlers depend on.
// Dependencies: hospital-appointments, hospital-audit, hospital-core,
// hospital-identity, hospital-rbac, hospital-token
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use hospital_appointments::Coordinator;
use hospital_audit::AuditStore;
use hospital_core::Clock;
use hospital_events::Publisher;
use hospital_identity::IdentityStore;
use hospital_rbac::{MemoryRoleStore, PermissionCache, Resolver, RoleStore};
use hospital_token::TokenService;

/// Default time-to-live for cached RBAC grants.
const PERMISSION_CACHE_TTL: Duration = Duration::from_secs(60);

/// Everything the in-process auth/appointments/audit handlers need, held
/// behind an `Arc` so cloning the router's state is cheap.
///
/// `roles` is held concretely (not `Arc<dyn RoleStore>`) because the
/// registration handler needs [`MemoryRoleStore::assign_role`] to grant the
/// `"patient"` role at signup time; the workspace has no durable `RoleStore`
/// implementation to swap in, and there is deliberately no RBAC admin HTTP
/// surface through which a caller could reach those seeding methods.
pub struct DomainState {
    pub identity: Arc<dyn IdentityStore>,
    pub roles: Arc<MemoryRoleStore>,
    pub resolver: Arc<Resolver>,
    pub permission_cache: Arc<PermissionCache>,
    pub tokens: Arc<TokenService>,
    pub appointments: Arc<Coordinator>,
    pub audit: Arc<dyn AuditStore>,
    pub publisher: Arc<dyn Publisher>,
    pub clock: Arc<dyn Clock>,
    pub default_tenant_id: String,
    pub lockout_threshold: u32,
    pub lockout_duration_minutes: u32,
    pub token_expiration_seconds: i64,
}

impl DomainState {
    /// Builds the domain state from its already-constructed components.
    /// `roles` and `resolver` wrap the same underlying store; handlers that
    /// need the raw effective-grants join (login, token refresh) use `roles`
    /// directly through [`Self::effective_grants`], while permission checks
    /// against an already-issued token go through `resolver`.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        roles: Arc<MemoryRoleStore>,
        tokens: Arc<TokenService>,
        appointments: Arc<Coordinator>,
        audit: Arc<dyn AuditStore>,
        publisher: Arc<dyn Publisher>,
        clock: Arc<dyn Clock>,
        default_tenant_id: String,
        lockout_threshold: u32,
        lockout_duration_minutes: u32,
        token_expiration_seconds: i64,
    ) -> Arc<Self> {
        let resolver = Arc::new(Resolver::new(roles.clone() as Arc<dyn RoleStore>));
        Arc::new(Self {
            identity,
            roles,
            resolver,
            permission_cache: Arc::new(PermissionCache::new(PERMISSION_CACHE_TTL)),
            tokens,
            appointments,
            audit,
            publisher,
            clock,
            default_tenant_id,
            lockout_threshold,
            lockout_duration_minutes,
            token_expiration_seconds,
        })
    }

    /// Resolves a user's effective roles/permissions, consulting the cache
    /// first and populating it on a miss. Used when minting a fresh token
    /// (login, refresh), never on the per-request permission-check path.
    ///
    /// # Errors
    ///
    /// Propagates [`hospital_core::HospitalError`] from the underlying store.
    pub async fn effective_grants(
        &self,
        tenant_id: &hospital_core::ids::TenantId,
        user_id: &str,
    ) -> Result<hospital_rbac::EffectiveGrants, hospital_core::HospitalError> {
        if let Some(cached) = self.permission_cache.get(tenant_id, user_id) {
            return Ok(cached);
        }
        let grants = self.roles.roles_with_permissions_for_user(tenant_id, user_id).await?;
        self.permission_cache.put(tenant_id, user_id, grants.clone());
        Ok(grants)
    }
}
