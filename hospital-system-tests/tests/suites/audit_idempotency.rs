// hospital-system-tests/tests/suites/audit_idempotency.rs
// ============================================================================
// Scenario: redelivering the same event id never journals more than once.
// ============================================================================

use axum::http::StatusCode;

use crate::helpers::app;
use crate::helpers::events;
use crate::helpers::http::Call;

const TENANT: &str = "tenant-system-test";

#[tokio::test]
async fn redelivering_the_same_event_id_journals_exactly_once() {
    let (app, router) = app::spawn(&[]).await;
    let event_id = uuid::Uuid::new_v4();

    for _ in 0..3 {
        events::publish_user_registered(&app, TENANT, event_id, "user-dup", "dup@example.com").await;
    }
    events::settle().await;

    assert!(app.domain_state.audit.contains_event(event_id).await.expect("audit store reachable"));

    let admin_token = app::mint_token(&app, TENANT, "admin-audit", "admin-audit@example.com", &["admin"]);
    let (status, body) = Call::new("GET", "/api/audit/user/user-dup").bearer(admin_token).send_json(&router).await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["entries"].as_array().expect("audit list responds with an array");
    let matching = entries.iter().filter(|entry| entry["event_id"] == event_id.to_string()).count();
    assert_eq!(matching, 1, "the same event id must never appear twice: {entries:?}");
}
