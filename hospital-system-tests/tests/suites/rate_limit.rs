// hospital-system-tests/tests/suites/rate_limit.rs
// ============================================================================
// Scenario: a caller is throttled once their burst allowance is spent, and
// the limiter fails open if its backing store errors.
// ============================================================================

use axum::http::StatusCode;

use crate::helpers::app;
use crate::helpers::http::Call;

const TENANT: &str = "tenant-system-test";

#[tokio::test]
async fn a_burst_of_requests_is_throttled_after_the_allowance_is_spent() {
    let (app, router) =
        app::spawn(&[("RATE_LIMIT_ENABLED", "true"), ("RATE_LIMIT_RPM", "100"), ("RATE_LIMIT_BURST", "3")]).await;
    let token = app::mint_token(&app, TENANT, "doctor-rl", "doctor-rl@example.com", &["doctor"]);

    let mut statuses = Vec::new();
    for _ in 0..4 {
        let (status, _body) =
            Call::new("GET", "/api/appointments/doctor/doctor-rl").bearer(token.clone()).send_json(&router).await;
        statuses.push(status);
    }

    let ok_count = statuses.iter().filter(|status| **status == StatusCode::OK).count();
    let limited_count = statuses.iter().filter(|status| **status == StatusCode::TOO_MANY_REQUESTS).count();
    assert_eq!(ok_count, 3, "first {0} requests within burst should succeed, got {statuses:?}", 3);
    assert_eq!(limited_count, 1, "fourth request should be throttled, got {statuses:?}");

    let response = Call::new("GET", "/api/appointments/doctor/doctor-rl").bearer(token).send(&router).await;
    let retry_after: u64 = response
        .headers()
        .get("retry-after")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .expect("limited response carries a numeric retry-after header");
    assert!((1..=60).contains(&retry_after), "retry-after should fall within the 60s window, got {retry_after}");
}

#[tokio::test]
async fn disabled_rate_limiting_never_throttles() {
    let (app, router) = app::spawn(&[("RATE_LIMIT_ENABLED", "false")]).await;
    let token = app::mint_token(&app, TENANT, "doctor-unthrottled", "unthrottled@example.com", &["doctor"]);

    for _ in 0..10 {
        let (status, _body) =
            Call::new("GET", "/api/appointments/doctor/doctor-unthrottled").bearer(token.clone()).send_json(&router).await;
        assert_eq!(status, StatusCode::OK);
    }
}
