// hospital-system-tests/tests/suites/auth_lockout.rs
// ============================================================================
// Scenario: register, log in, then lock out after repeated bad passwords.
// ============================================================================

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::app;
use crate::helpers::http::Call;

#[tokio::test]
async fn registers_logs_in_and_locks_out_after_five_bad_passwords() {
    let (_app, router) = app::spawn(&[]).await;

    let (status, _body) = Call::new("POST", "/api/auth/register")
        .json(json!({"name": "Alice", "email": "alice@example.com", "password": "Correct-Horse-1", "phone": null}))
        .send_json(&router)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = Call::new("POST", "/api/auth/login")
        .json(json!({"email": "alice@example.com", "password": "Correct-Horse-1", "phone": null}))
        .send_json(&router)
        .await;
    assert_eq!(status, StatusCode::OK);
    let access_token = body["token"].as_str().expect("login returns a token").to_string();

    let (status, _body) = Call::new("GET", "/api/auth/me").bearer(access_token).send_json(&router).await;
    assert_eq!(status, StatusCode::OK);

    for attempt in 1..=5 {
        let (status, _body) = Call::new("POST", "/api/auth/login")
            .json(json!({"email": "alice@example.com", "password": "wrong-password"}))
            .send_json(&router)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "attempt {attempt} should reject the bad password, not lock yet");
    }

    let (status, _body) = Call::new("POST", "/api/auth/login")
        .json(json!({"email": "alice@example.com", "password": "wrong-password"}))
        .send_json(&router)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "sixth attempt must find the account already locked");

    let (status, _body) = Call::new("POST", "/api/auth/login")
        .json(json!({"email": "alice@example.com", "password": "Correct-Horse-1", "phone": null}))
        .send_json(&router)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "even the correct password is rejected while locked");
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let (_app, router) = app::spawn(&[]).await;
    let registration = json!({"name": "Bob", "email": "bob@example.com", "password": "Correct-Horse-1", "phone": null});

    let (status, _body) = Call::new("POST", "/api/auth/register").json(registration.clone()).send_json(&router).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _body) = Call::new("POST", "/api/auth/register").json(registration).send_json(&router).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
