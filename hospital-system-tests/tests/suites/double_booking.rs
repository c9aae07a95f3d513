// hospital-system-tests/tests/suites/double_booking.rs
// ============================================================================
// Scenario: two concurrent bookings for the same doctor and slot resolve to
// exactly one winner; the loser is rejected as a validation error.
// ============================================================================

use axum::http::StatusCode;
use hospital_core::specialty::{Disease, Specialty};
use serde_json::json;
use time::OffsetDateTime;

use crate::helpers::app;
use crate::helpers::events;
use crate::helpers::http::Call;

const TENANT: &str = "tenant-system-test";

fn tomorrow() -> String {
    let tomorrow = OffsetDateTime::now_utc() + time::Duration::days(1);
    tomorrow.format(&time::format_description::well_known::Rfc3339).expect("formats")
}

#[tokio::test]
async fn concurrent_bookings_for_the_same_slot_yield_exactly_one_winner() {
    let (app, router) = app::spawn(&[]).await;

    events::publish_patient_created(&app, TENANT, "patient-a", Disease::Diabetes).await;
    events::publish_patient_created(&app, TENANT, "patient-b", Disease::Hypertension).await;
    events::publish_doctor_created(&app, TENANT, "doctor-shared", Specialty::GeneralMedicine).await;

    let token_a = app::mint_token(&app, TENANT, "patient-a", "a@example.com", &["patient"]);
    let token_b = app::mint_token(&app, TENANT, "patient-b", "b@example.com", &["patient"]);
    let slot = tomorrow();

    let first = Call::new("POST", "/api/appointments")
        .bearer(token_a)
        .json(json!({"patient_id": "patient-a", "doctor_id": "doctor-shared", "appointment_date": slot.clone(), "reason": null}));
    let second = Call::new("POST", "/api/appointments")
        .bearer(token_b)
        .json(json!({"patient_id": "patient-b", "doctor_id": "doctor-shared", "appointment_date": slot, "reason": null}));

    let (first_result, second_result) = tokio::join!(first.send_json(&router), second.send_json(&router));

    let statuses = [first_result.0, second_result.0];
    let created = statuses.iter().filter(|status| **status == StatusCode::CREATED).count();
    let rejected = statuses.iter().filter(|status| **status == StatusCode::BAD_REQUEST).count();
    assert_eq!(created, 1, "exactly one booking should win the slot, got {statuses:?}");
    assert_eq!(rejected, 1, "the loser should be rejected as a validation error, got {statuses:?}");
}
