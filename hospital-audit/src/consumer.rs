// hospital-audit/src/consumer.rs
// ============================================================================
// Module: Audit Consumer
// Description: Translates the generic event envelope into one AuditEntry
// per distinct eventId.
// Dependencies: async-trait, hospital-core, hospital-events, tracing, uuid
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use hospital_core::{EventEnvelope, EventType};
use hospital_events::{Consumer, EventError};

use crate::model::AuditEntry;
use crate::store::AuditStore;

/// Subscribes to every domain event family and journals one [`AuditEntry`]
/// per `event_id`. `cache.invalidate` is internal housekeeping, not a
/// business action, and is skipped.
pub struct AuditConsumer {
    store: Arc<dyn AuditStore>,
}

impl AuditConsumer {
    /// Builds a consumer backed by the given store.
    #[must_use]
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }
}

/// Maps an event type to the `(action, resourceType)` pair recorded on its
/// audit entry.
fn action_and_resource(event_type: EventType) -> Option<(&'static str, &'static str)> {
    match event_type {
        EventType::UserRegistered => Some(("REGISTER", "USER")),
        EventType::UserUpdated => Some(("UPDATE", "USER")),
        EventType::PatientCreated => Some(("CREATE", "PATIENT")),
        EventType::PatientUpdated => Some(("UPDATE", "PATIENT")),
        EventType::PatientDeleted => Some(("DELETE", "PATIENT")),
        EventType::DoctorCreated => Some(("CREATE", "DOCTOR")),
        EventType::DoctorUpdated => Some(("UPDATE", "DOCTOR")),
        EventType::AppointmentCreated => Some(("CREATE", "APPOINTMENT")),
        EventType::AppointmentCancelled => Some(("CANCEL", "APPOINTMENT")),
        EventType::MedicalRecordCreated => Some(("CREATE", "MEDICAL_RECORD")),
        EventType::PrescriptionCreated => Some(("CREATE", "PRESCRIPTION")),
        EventType::FacilityAdmitted => Some(("ADMIT", "FACILITY")),
        EventType::FacilityDischarged => Some(("DISCHARGE", "FACILITY")),
        EventType::CacheInvalidate => None,
    }
}

/// Pulls the first present field out of the payload, in priority order;
/// used to find whichever id key a given event's payload happens to carry.
fn first_string_field(payload: &serde_json::Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|key| payload.get(key))
        .and_then(|value| value.as_str())
        .map(str::to_string)
}

fn resource_id(payload: &serde_json::Value) -> Option<String> {
    first_string_field(
        payload,
        &["id", "patientId", "doctorId", "appointmentId", "userId", "recordId"],
    )
}

#[async_trait]
impl Consumer for AuditConsumer {
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), EventError> {
        let Some((action, resource_type)) = action_and_resource(envelope.event_type) else {
            return Ok(());
        };

        let entry = AuditEntry {
            id: uuid::Uuid::new_v4(),
            tenant_id: envelope.tenant_id.clone(),
            user_id: first_string_field(&envelope.payload, &["userId"]),
            user_email: first_string_field(&envelope.payload, &["email", "userEmail"]),
            action: action.to_string(),
            resource_type: resource_type.to_string(),
            resource_id: resource_id(&envelope.payload),
            description: None,
            old_value: envelope.payload.get("oldValue").cloned(),
            new_value: Some(envelope.payload.clone()),
            ip: None,
            agent: None,
            event_id: envelope.event_id,
            timestamp: envelope.occurred_at,
        };

        self.store
            .append(entry)
            .await
            .map_err(|error| EventError::ConsumerFailed {
                event_id: envelope.event_id,
                reason: error.to_string(),
            })?;
        Ok(())
    }
}
