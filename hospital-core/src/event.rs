// hospital-core/src/event.rs
// ============================================================================
// Module: Event Envelope
// Description: The wire envelope and routing-key vocabulary shared by every
// producer and consumer in the event fabric.
// Purpose: Avoid a "parent class" DTO hierarchy; each event is a plain tagged
// record keyed by `eventType`, decoded through a type registry.
// Dependencies: serde, serde_json, time, uuid
// ============================================================================

//! ## Overview
//! Every event carries `{eventId, eventType, occurredAt, tenantId, ...payload}`
//! and is immutable once emitted. Rather than a class hierarchy of event
//! DTOs, [`EventEnvelope`] is one plain struct with an opaque JSON `payload`;
//! the `event_type` field is the registry key consumers use to decode it into
//! a concrete payload type. This sidesteps the deep-inheritance pattern the
//! source material uses for event DTOs (see the re-architecture notes in the
//! design document).

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::ids::TenantId;

/// Routing keys for every event family the fabric carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    UserRegistered,
    UserUpdated,
    PatientCreated,
    PatientUpdated,
    PatientDeleted,
    DoctorCreated,
    DoctorUpdated,
    AppointmentCreated,
    AppointmentCancelled,
    MedicalRecordCreated,
    PrescriptionCreated,
    FacilityAdmitted,
    FacilityDischarged,
    CacheInvalidate,
}

impl EventType {
    /// Returns the `<aggregate>.<verb>` routing key for this event type.
    #[must_use]
    pub const fn routing_key(self) -> &'static str {
        match self {
            Self::UserRegistered => "user.registered",
            Self::UserUpdated => "user.updated",
            Self::PatientCreated => "patient.created",
            Self::PatientUpdated => "patient.updated",
            Self::PatientDeleted => "patient.deleted",
            Self::DoctorCreated => "doctor.created",
            Self::DoctorUpdated => "doctor.updated",
            Self::AppointmentCreated => "appointment.created",
            Self::AppointmentCancelled => "appointment.cancelled",
            Self::MedicalRecordCreated => "medical.record.created",
            Self::PrescriptionCreated => "prescription.created",
            Self::FacilityAdmitted => "facility.admitted",
            Self::FacilityDischarged => "facility.discharged",
            Self::CacheInvalidate => "cache.invalidate",
        }
    }

    /// Returns the aggregate name a routing key's prefix identifies, used to
    /// give per-aggregate queues FIFO ordering.
    #[must_use]
    pub fn aggregate(self) -> &'static str {
        self.routing_key()
            .split('.')
            .next()
            .unwrap_or(self.routing_key())
    }
}

/// The immutable envelope every event is published and consumed as.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Idempotency key; consumers dedupe on this.
    pub event_id: Uuid,
    /// Routing/type discriminator.
    pub event_type: EventType,
    /// Time the event was produced, set by the producer, not the broker.
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
    /// Tenant the event belongs to.
    pub tenant_id: TenantId,
    /// Type-specific payload, decoded by the consumer via `event_type`.
    pub payload: serde_json::Value,
}

impl EventEnvelope {
    /// Builds a new envelope with a freshly generated `event_id`.
    #[must_use]
    pub fn new(
        event_type: EventType,
        occurred_at: OffsetDateTime,
        tenant_id: TenantId,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type,
            occurred_at,
            tenant_id,
            payload,
        }
    }

    /// Decodes the payload into a concrete type, as a consumer would after
    /// dispatching on `event_type`.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload does not match `T`'s shape.
    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }

    /// Returns true when the envelope carries a non-blank tenant id, per the
    /// consumption contract ("if `tenantId` is missing or blank, drop").
    #[must_use]
    pub fn has_valid_tenant(&self) -> bool {
        !self.tenant_id.is_blank()
    }
}
