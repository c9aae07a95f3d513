// hospital-cli/src/wiring.rs
// ============================================================================
// Module: Component Wiring
// Description: Builds every domain component by hand and assembles the
// gateway-fronted router. Shared by the production binary and the
// system-tests crate, which drives the returned router directly with
// `tower::ServiceExt::oneshot` instead of binding a socket.
// Dependencies: axum, hospital-appointments, hospital-audit, hospital-config,
// hospital-core, hospital-events, hospital-gateway, hospital-identity,
// hospital-rbac, hospital-snapshots, hospital-store-sqlite, hospital-token
// ============================================================================

use std::sync::Arc;

use axum::Router;
use hospital_appointments::{Coordinator, InMemoryAppointmentStore};
use hospital_audit::{AuditConsumer, AuditStore, InMemoryAuditStore};
use hospital_config::AppConfig;
use hospital_core::clock::SystemClock;
use hospital_core::Clock;
use hospital_events::{InMemoryDeadLetterSink, InMemoryProcessedEventLedger, InProcessBroker, Publisher};
use hospital_gateway::state::AppState as GatewayState;
use hospital_identity::{IdentityStore, MemoryIdentityStore};
use hospital_rbac::{MemoryRoleStore, Permission, Role};
use hospital_snapshots::{CacheInvalidationBus, DashMapSnapshotStore, DoctorFacts, DoctorFactsConsumer, PatientFacts, PatientFactsConsumer};
use hospital_store_sqlite::{SqliteAuditStore, SqliteIdentityStore};
use hospital_token::TokenService;

use crate::router;
use crate::state::DomainState;

/// Roles every fresh deployment ships with. There is no RBAC admin HTTP
/// surface, so this fixed set is the only way roles ever come to exist.
const SYSTEM_ROLES: &[&str] = &["admin", "doctor", "nurse", "patient"];

/// `(resource, action)` pairs granted to every role. Deliberately coarse —
/// the finer-grained per-object overrides go through
/// `MemoryRoleStore::grant_resource_permission`, unused by this binary since
/// the handlers enforce patient/doctor ownership inline rather than through
/// resource grants.
const ROLE_PERMISSIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "admin",
        &[
            ("appointment", "create"),
            ("appointment", "read"),
            ("appointment", "update"),
            ("appointment", "cancel"),
            ("appointment", "delete"),
            ("audit", "read"),
        ],
    ),
    (
        "nurse",
        &[
            ("appointment", "create"),
            ("appointment", "read"),
            ("appointment", "update"),
            ("appointment", "cancel"),
            ("audit", "read"),
        ],
    ),
    ("doctor", &[("appointment", "read"), ("appointment", "update")]),
    ("patient", &[("appointment", "create"), ("appointment", "read"), ("appointment", "cancel")]),
];

/// Seeds the fixed role/permission catalog a fresh deployment needs before
/// any user registers. Without this, [`MemoryRoleStore::assign_role`]'s call
/// at signup time would grant a role with no matching `Role` row, and
/// `roles_with_permissions_for_user`'s join would silently return zero
/// effective permissions.
fn seed_roles(roles: &MemoryRoleStore, tenant_id: &hospital_core::ids::TenantId) {
    for &role_name in SYSTEM_ROLES {
        roles.put_role(Role {
            id: role_name.to_string(),
            tenant_id: tenant_id.clone(),
            name: role_name.to_string(),
            is_system_role: true,
            active: true,
        });
    }
    for &(role_name, grants) in ROLE_PERMISSIONS {
        for &(resource, action) in grants {
            let permission_id = format!("{resource}:{action}");
            roles.put_permission(Permission {
                id: permission_id.clone(),
                name: Permission::name_for(resource, action),
                resource: resource.to_string(),
                action: action.to_string(),
                is_system_permission: true,
            });
            roles.grant_role_permission(role_name, &permission_id);
        }
    }
}

/// Everything [`build_app`] assembled, for callers (tests) that need to
/// reach into a component the router doesn't expose, e.g. to fast-forward
/// a fake clock or inspect the audit store directly.
pub struct App {
    pub router: Router,
    pub domain_state: Arc<DomainState>,
    pub gateway_state: Arc<GatewayState>,
}

/// Builds every domain component from `config` and assembles the
/// gateway-fronted router. The production binary binds a `TcpListener` and
/// calls `axum::serve` on the result; tests drive it with
/// `tower::ServiceExt::oneshot`.
///
/// # Errors
///
/// Returns an error if the identity/audit store, token service, or gateway
/// state fail to construct.
pub async fn build_app(config: &AppConfig) -> anyhow::Result<App> {
    let default_tenant_id = hospital_core::ids::TenantId::new(config.default_tenant_id.clone());

    let identity: Arc<dyn IdentityStore> = match &config.storage.database_path {
        Some(path) => Arc::new(SqliteIdentityStore::open(path)?),
        None => Arc::new(MemoryIdentityStore::new()),
    };
    let audit: Arc<dyn AuditStore> = match &config.storage.database_path {
        Some(path) => Arc::new(SqliteAuditStore::open(path)?),
        None => Arc::new(InMemoryAuditStore::new()),
    };

    let roles = Arc::new(MemoryRoleStore::new());
    seed_roles(&roles, &default_tenant_id);

    let gateway_tokens = TokenService::new(&config.token)?;
    let domain_tokens = Arc::new(TokenService::new(&config.token)?);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let broker = Arc::new(InProcessBroker::new());
    let publisher: Arc<dyn Publisher> = broker.clone();
    let ledger = Arc::new(InMemoryProcessedEventLedger::new());
    let dead_letters = Arc::new(InMemoryDeadLetterSink::new());

    let patient_snapshots = Arc::new(DashMapSnapshotStore::<PatientFacts>::new());
    let doctor_snapshots = Arc::new(DashMapSnapshotStore::<DoctorFacts>::new());
    let invalidation_bus = Arc::new(CacheInvalidationBus::new(publisher.clone()));

    let _audit_consumer_handle =
        broker.subscribe("audit", Arc::new(AuditConsumer::new(audit.clone())), ledger.clone(), dead_letters.clone());
    let _patient_facts_handle = broker.subscribe(
        "patient-facts",
        Arc::new(PatientFactsConsumer::new(patient_snapshots.clone(), invalidation_bus.clone())),
        ledger.clone(),
        dead_letters.clone(),
    );
    let _doctor_facts_handle = broker.subscribe(
        "doctor-facts",
        Arc::new(DoctorFactsConsumer::new(doctor_snapshots.clone(), invalidation_bus.clone())),
        ledger.clone(),
        dead_letters.clone(),
    );

    let appointment_store = Arc::new(InMemoryAppointmentStore::new());
    let coordinator = Arc::new(Coordinator::new(
        appointment_store,
        patient_snapshots,
        doctor_snapshots,
        publisher.clone(),
        clock.clone(),
    ));

    let domain_state = DomainState::new(
        identity,
        roles,
        domain_tokens,
        coordinator,
        audit,
        publisher,
        clock,
        config.default_tenant_id.clone(),
        config.identity.lockout_threshold,
        config.identity.lockout_duration_minutes,
        i64::try_from(config.token.expiration_seconds).unwrap_or(i64::MAX),
    );

    let gateway_state = GatewayState::new(config.gateway.clone(), gateway_tokens)?;
    let metrics_handle = hospital_gateway::install_metrics_recorder()?;
    let router = hospital_gateway::build_router(
        gateway_state.clone(),
        metrics_handle,
        router::domain_router(domain_state.clone()).into(),
    );

    Ok(App { router, domain_state, gateway_state })
}
