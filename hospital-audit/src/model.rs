// hospital-audit/src/model.rs
// ============================================================================
// Module: Audit Entry
// Description: The append-only journal row built from a domain event.
// Dependencies: hospital-core, serde, serde_json, time, uuid
// ============================================================================

use hospital_core::ids::TenantId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

/// One row in the audit journal. `event_id` is the idempotency key: two
/// entries never share one, so replaying the event stream after a crash
/// never double-journals an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub description: Option<String>,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
    pub ip: Option<String>,
    pub agent: Option<String>,
    pub event_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}
