// hospital-snapshots/src/consumer.rs
// ============================================================================
// Module: Snapshot Consumers
// Description: Applies the create/update/upsert-on-update-miss/delete rules
// from patient and doctor domain events onto their snapshot stores.
// Dependencies: async-trait, hospital-core, hospital-events, tracing
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use hospital_core::specialty::{Disease, Specialty};
use hospital_core::{EventEnvelope, EventType};
use hospital_events::{Consumer, EventError};
use serde::Deserialize;
use time::OffsetDateTime;

use crate::bus::CacheInvalidationBus;
use crate::model::{DoctorFacts, PatientFacts};
use crate::store::SnapshotStore;

#[derive(Debug, Deserialize)]
struct PatientEventPayload {
    id: String,
    name: String,
    email: String,
    phone: Option<String>,
    gender: Option<String>,
    disease: Disease,
}

#[derive(Debug, Deserialize)]
struct DoctorEventPayload {
    id: String,
    name: String,
    email: String,
    phone: Option<String>,
    gender: Option<String>,
    specialty: Specialty,
}

/// Returns true when `incoming` should replace `current` under last-write-
/// wins: no current row, or the incoming event is not older.
fn wins(current: Option<&OffsetDateTime>, incoming: OffsetDateTime) -> bool {
    match current {
        None => true,
        Some(current) => *current <= incoming,
    }
}

/// Maintains [`PatientFacts`] from `patient.*` events.
pub struct PatientFactsConsumer {
    store: Arc<dyn SnapshotStore<PatientFacts>>,
    invalidation: Arc<CacheInvalidationBus>,
}

impl PatientFactsConsumer {
    /// Builds a consumer over the given store and invalidation bus.
    #[must_use]
    pub fn new(store: Arc<dyn SnapshotStore<PatientFacts>>, invalidation: Arc<CacheInvalidationBus>) -> Self {
        Self { store, invalidation }
    }
}

#[async_trait]
impl Consumer for PatientFactsConsumer {
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), EventError> {
        match envelope.event_type {
            EventType::PatientCreated | EventType::PatientUpdated => {
                let payload: PatientEventPayload = envelope
                    .decode()
                    .map_err(|err| EventError::ConsumerFailed { event_id: envelope.event_id, reason: err.to_string() })?;
                let current = self.store.get(&envelope.tenant_id, &payload.id).await;
                if envelope.event_type == EventType::PatientUpdated && current.is_none() {
                    tracing::warn!(patient_id = %payload.id, "patient.updated for unknown snapshot, treating as create");
                }
                if wins(current.as_ref().map(|facts| &facts.occurred_at), envelope.occurred_at) {
                    self.store.put(
                        &envelope.tenant_id,
                        payload.id.clone(),
                        PatientFacts {
                            id: payload.id.clone(),
                            name: payload.name,
                            email: payload.email,
                            phone: payload.phone,
                            gender: payload.gender,
                            disease: payload.disease,
                            occurred_at: envelope.occurred_at,
                        },
                    )
                    .await;
                    self.invalidation.invalidate_entity(&envelope.tenant_id, &["patient-snapshots", "appointment-reads"], &payload.id).await;
                }
                Ok(())
            }
            EventType::PatientDeleted => {
                let payload: PatientEventPayload = envelope
                    .decode()
                    .map_err(|err| EventError::ConsumerFailed { event_id: envelope.event_id, reason: err.to_string() })?;
                self.store.delete(&envelope.tenant_id, &payload.id).await;
                self.invalidation.invalidate_entity(&envelope.tenant_id, &["patient-snapshots", "appointment-reads"], &payload.id).await;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

/// Maintains [`DoctorFacts`] from `doctor.*` events.
pub struct DoctorFactsConsumer {
    store: Arc<dyn SnapshotStore<DoctorFacts>>,
    invalidation: Arc<CacheInvalidationBus>,
}

impl DoctorFactsConsumer {
    /// Builds a consumer over the given store and invalidation bus.
    #[must_use]
    pub fn new(store: Arc<dyn SnapshotStore<DoctorFacts>>, invalidation: Arc<CacheInvalidationBus>) -> Self {
        Self { store, invalidation }
    }
}

#[async_trait]
impl Consumer for DoctorFactsConsumer {
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), EventError> {
        match envelope.event_type {
            EventType::DoctorCreated | EventType::DoctorUpdated => {
                let payload: DoctorEventPayload = envelope
                    .decode()
                    .map_err(|err| EventError::ConsumerFailed { event_id: envelope.event_id, reason: err.to_string() })?;
                let current = self.store.get(&envelope.tenant_id, &payload.id).await;
                if envelope.event_type == EventType::DoctorUpdated && current.is_none() {
                    tracing::warn!(doctor_id = %payload.id, "doctor.updated for unknown snapshot, treating as create");
                }
                if wins(current.as_ref().map(|facts| &facts.occurred_at), envelope.occurred_at) {
                    self.store.put(
                        &envelope.tenant_id,
                        payload.id.clone(),
                        DoctorFacts {
                            id: payload.id.clone(),
                            name: payload.name,
                            email: payload.email,
                            phone: payload.phone,
                            gender: payload.gender,
                            specialty: payload.specialty,
                            occurred_at: envelope.occurred_at,
                        },
                    )
                    .await;
                    self.invalidation.invalidate_entity(&envelope.tenant_id, &["doctor-snapshots", "appointment-reads"], &payload.id).await;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
