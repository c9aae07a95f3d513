// hospital-system-tests/tests/helpers/events.rs
// ============================================================================
// Module: Synthetic Domain Events
// Description: Publishes `patient.created`/`doctor.created` directly onto
// the broker, standing in for the external patient/doctor services this
// platform only ever observes through events.
// Dependencies: hospital-appointments, hospital-cli, hospital-core,
// hospital-events, tokio
// ============================================================================

use std::time::Duration;

use hospital_cli::wiring::App;
use hospital_core::ids::TenantId;
use hospital_core::specialty::{Disease, Specialty};
use hospital_core::{EventEnvelope, EventType};

/// How long to wait after publishing for the broker's background consumer
/// task to apply the snapshot, matching the settling window the event
/// fabric's own tests use after a publish.
const SETTLE: Duration = Duration::from_millis(50);

pub async fn publish_patient_created(app: &App, tenant_id: &str, patient_id: &str, disease: Disease) {
    let payload = serde_json::json!({
        "id": patient_id,
        "name": "System Test Patient",
        "email": format!("{patient_id}@example.com"),
        "phone": null,
        "gender": null,
        "disease": disease,
    });
    let envelope = EventEnvelope::new(EventType::PatientCreated, app.domain_state.clock.now(), TenantId::new(tenant_id), payload);
    app.domain_state.publisher.publish(envelope).await.expect("publish succeeds");
    tokio::time::sleep(SETTLE).await;
}

pub async fn publish_doctor_created(app: &App, tenant_id: &str, doctor_id: &str, specialty: Specialty) {
    let payload = serde_json::json!({
        "id": doctor_id,
        "name": "System Test Doctor",
        "email": format!("{doctor_id}@example.com"),
        "phone": null,
        "gender": null,
        "specialty": specialty,
    });
    let envelope = EventEnvelope::new(EventType::DoctorCreated, app.domain_state.clock.now(), TenantId::new(tenant_id), payload);
    app.domain_state.publisher.publish(envelope).await.expect("publish succeeds");
    tokio::time::sleep(SETTLE).await;
}

/// Publishes a `user.registered` envelope with the given `event_id`,
/// bypassing `/api/auth/register` for scenarios that only care about the
/// audit journal's idempotency, not the registration handler itself.
pub async fn publish_user_registered(app: &App, tenant_id: &str, event_id: uuid::Uuid, user_id: &str, email: &str) {
    let payload = serde_json::json!({"userId": user_id, "email": email, "name": user_id});
    let envelope = EventEnvelope {
        event_id,
        event_type: EventType::UserRegistered,
        occurred_at: app.domain_state.clock.now(),
        tenant_id: TenantId::new(tenant_id),
        payload,
    };
    app.domain_state.publisher.publish(envelope).await.expect("publish succeeds");
}

pub async fn settle() {
    tokio::time::sleep(SETTLE).await;
}
