// hospital-snapshots/src/model.rs
// ============================================================================
// Module: Snapshot Facts
// Description: Denormalized fact rows projected from the identity/patient/
// doctor domains, plus the cache invalidation wire payload.
// Dependencies: hospital-core, serde, time
// ============================================================================

use hospital_core::specialty::{Disease, Specialty};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Denormalized patient facts used by the Appointment Coordinator's
/// specialty-match check, last-write-wins per `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientFacts {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub disease: Disease,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

/// Denormalized doctor facts used by the Appointment Coordinator's
/// specialty-match check, last-write-wins per `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorFacts {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub specialty: Specialty,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

/// Wire payload for a tenant-wide (or targeted) cache invalidation
/// broadcast: `{cacheNames, entityIds, invalidateAll}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheInvalidatePayload {
    pub cache_names: Vec<String>,
    pub entity_ids: Vec<String>,
    pub invalidate_all: bool,
}
