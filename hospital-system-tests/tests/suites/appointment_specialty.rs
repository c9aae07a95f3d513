// hospital-system-tests/tests/suites/appointment_specialty.rs
// ============================================================================
// Scenario: booking rejects a specialty mismatch, then succeeds once the
// doctor's specialty snapshot changes to one that treats the disease.
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
async fn rejects_then_accepts_once_the_doctor_specialty_matches() {
    let (app, router) = app::spawn(&[]).await;
    let token = app::mint_token(&app, TENANT, "patient-1", "patient@example.com", &["patient"]);

    events::publish_patient_created(&app, TENANT, "patient-1", Disease::Diabetes).await;
    events::publish_doctor_created(&app, TENANT, "doctor-1", Specialty::Cardiology).await;

    let (status, body) = Call::new("POST", "/api/appointments")
        .bearer(token.clone())
        .json(json!({"patient_id": "patient-1", "doctor_id": "doctor-1", "appointment_date": tomorrow(), "reason": null}))
        .send_json(&router)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = body["message"].as_str().unwrap_or_default().to_lowercase();
    assert!(message.contains("cardiology") || message.contains("specialty"), "unexpected message: {message}");

    events::publish_doctor_created(&app, TENANT, "doctor-1", Specialty::Endocrinology).await;

    let (status, body) = Call::new("POST", "/api/appointments")
        .bearer(token)
        .json(json!({"patient_id": "patient-1", "doctor_id": "doctor-1", "appointment_date": tomorrow(), "reason": null}))
        .send_json(&router)
        .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
    assert_eq!(body["status"], json!("PENDING"));
}

#[tokio::test]
async fn general_medicine_doctor_treats_any_disease() {
    let (app, router) = app::spawn(&[]).await;
    let token = app::mint_token(&app, TENANT, "patient-2", "patient2@example.com", &["patient"]);

    events::publish_patient_created(&app, TENANT, "patient-2", Disease::Cancer).await;
    events::publish_doctor_created(&app, TENANT, "doctor-2", Specialty::GeneralMedicine).await;

    let (status, body) = Call::new("POST", "/api/appointments")
        .bearer(token)
        .json(json!({"patient_id": "patient-2", "doctor_id": "doctor-2", "appointment_date": tomorrow(), "reason": null}))
        .send_json(&router)
        .await;
    assert_eq!(status, StatusCode::CREATED, "unexpected body: {body}");
}
