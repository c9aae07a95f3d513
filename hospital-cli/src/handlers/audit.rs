// hospital-cli/src/handlers/audit.rs
// ============================================================================
// Module: Audit Handlers
// Description: Read surface over the audit journal; writes happen only
// through the event-fabric consumer, never via this API.
// Dependencies: axum, hospital-audit, hospital-core
// ============================================================================

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use hospital_audit::{AuditEntry, AuditStore};
use hospital_core::HospitalError;
use serde::Serialize;

use crate::context::AuthContext;
use crate::state::DomainState;

const ROLE_ADMIN: &str = "admin";
const ROLE_NURSE: &str = "nurse";

fn require_staff(auth: &AuthContext) -> Result<(), HospitalError> {
    if auth.has_role(ROLE_ADMIN) || auth.has_role(ROLE_NURSE) {
        Ok(())
    } else {
        Err(HospitalError::Forbidden("only staff may read the audit journal".to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct AuditEntryList {
    pub entries: Vec<AuditEntry>,
}

/// `GET /api/audit/user/{id}`, staff-only.
///
/// # Errors
///
/// Returns [`HospitalError::Forbidden`] for non-staff callers.
pub async fn list_by_user(
    State(state): State<Arc<DomainState>>,
    auth: AuthContext,
    Path(user_id): Path<String>,
) -> Result<Json<AuditEntryList>, HospitalError> {
    require_staff(&auth)?;
    let entries = state.audit.list_by_user(&auth.tenant_id, &user_id).await?;
    Ok(Json(AuditEntryList { entries }))
}

/// `GET /api/audit/resource/{type}/{id}`, staff-only.
///
/// # Errors
///
/// Returns [`HospitalError::Forbidden`] for non-staff callers.
pub async fn list_by_resource(
    State(state): State<Arc<DomainState>>,
    auth: AuthContext,
    Path((resource_type, resource_id)): Path<(String, String)>,
) -> Result<Json<AuditEntryList>, HospitalError> {
    require_staff(&auth)?;
    let entries = state
        .audit
        .list_by_resource(&auth.tenant_id, &resource_type.to_uppercase(), &resource_id)
        .await?;
    Ok(Json(AuditEntryList { entries }))
}
