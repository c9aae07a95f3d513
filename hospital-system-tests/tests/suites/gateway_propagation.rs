// hospital-system-tests/tests/suites/gateway_propagation.rs
// ============================================================================
// Scenario: the gateway rejects an unauthenticated proxied request and
// forwards the trusted identity headers to the downstream service once
// authenticated.
// ============================================================================

use axum::http::StatusCode;

use crate::helpers::app;
use crate::helpers::http::Call;
use crate::helpers::stub_server;

const TENANT: &str = "tenant-system-test";

#[tokio::test]
async fn proxied_route_without_a_token_is_rejected() {
    let (_app, router) = app::spawn(&[]).await;
    let (status, _body) = Call::new("GET", "/api/patients/p1").send_json(&router).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticated_proxied_request_carries_tenant_user_and_request_id_upstream() {
    let (app, router) = app::spawn(&[]).await;
    let stub = stub_server::spawn().await;
    app.gateway_state.register_service("patient-service", vec![stub.base_url.clone()]);

    let token = app::mint_token(&app, TENANT, "admin-1", "admin@example.com", &["admin"]);
    let (status, _body) = Call::new("GET", "/api/patients/p1").bearer(token).send_json(&router).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(stub.last_header("x-tenant-id").as_deref(), Some(TENANT));
    assert_eq!(stub.last_header("x-user-id").as_deref(), Some("admin-1"));
    assert!(stub.last_header("x-request-id").is_some(), "gateway must stamp a request id on every hop");
}
