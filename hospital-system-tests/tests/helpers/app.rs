// hospital-system-tests/tests/helpers/app.rs
// ============================================================================
// Module: App Fixture
// Description: Builds a real `wiring::App` from an in-memory environment and
// wraps its router with `MockConnectInfo`, the stand-in for the peer address
// `axum::serve` would otherwise supply.
// Dependencies: axum, hospital-cli, hospital-config, hospital-core,
// hospital-token
// ============================================================================

use std::net::SocketAddr;

use axum::extract::connect_info::MockConnectInfo;
use axum::Router;
use hospital_cli::wiring::{self, App};
use hospital_config::{AppConfig, MapEnv};
use hospital_core::clock::SystemClock;
use hospital_token::MintRequest;

/// Env vars every scenario needs unless it overrides them: a secret long
/// enough for HS512, a fixed default tenant, and a lockout threshold low
/// enough to exercise within a handful of requests.
fn base_env() -> Vec<(&'static str, &'static str)> {
    vec![
        ("JWT_SECRET", "system-test-signing-secret-0123456789abcdef"),
        ("DEFAULT_TENANT_ID", "tenant-system-test"),
        ("LOCKOUT_THRESHOLD", "5"),
        ("LOCKOUT_DURATION_MINUTES", "30"),
        ("RATE_LIMIT_ENABLED", "false"),
    ]
}

/// Builds an `App` from the base environment plus `overrides`, wraps its
/// router with a fake peer address, and returns both.
pub async fn spawn(overrides: &[(&str, &str)]) -> (App, Router) {
    let mut env: std::collections::HashMap<String, String> =
        base_env().into_iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    for &(key, value) in overrides {
        env.insert(key.to_string(), value.to_string());
    }
    let config = AppConfig::load(&MapEnv(env)).expect("system test config is valid");
    let app = wiring::build_app(&config).await.expect("app wiring succeeds");
    let router = app.router.clone().layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 0))));
    (app, router)
}

/// Mints an access token for a synthetic caller without going through
/// `/api/auth/register` + `/api/auth/login`, for scenarios that only need an
/// authenticated caller and not the registration/login flow itself.
pub fn mint_token(app: &App, tenant_id: &str, user_id: &str, email: &str, roles: &[&str]) -> String {
    app.domain_state
        .tokens
        .mint_access_token(
            &SystemClock,
            &MintRequest {
                user_id: user_id.to_string(),
                tenant_id: tenant_id.to_string(),
                email: email.to_string(),
                name: user_id.to_string(),
                roles: roles.iter().map(ToString::to_string).collect(),
                permissions: vec![],
                department: None,
            },
        )
        .expect("mints a token")
}
