// hospital-gateway/src/health.rs
// ============================================================================
// Module: Health & Metrics Endpoints
// Description: Liveness, readiness (probes the auth service), aggregate
// health, and Prometheus metrics exposition.
// Dependencies: axum, metrics-exporter-prometheus, reqwest, serde_json
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;

use crate::state::AppState;

/// Always reports healthy once the process has started; this is what an
/// orchestrator uses to decide whether to restart the container.
pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "UP"})))
}

/// How long a downstream reachability probe is allowed to take before the
/// service is reported unreachable.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

async fn probe(client: &reqwest::Client, base_url: &str) -> bool {
    let url = format!("{base_url}/q/health/live");
    tokio::time::timeout(PROBE_TIMEOUT, client.get(&url).send())
        .await
        .ok()
        .and_then(Result::ok)
        .is_some_and(|response| response.status().is_success())
}

/// Readiness requires at least the auth service to answer; every other
/// registered service is probed too and reported, but does not gate the
/// overall verdict — the gateway itself only hard-depends on auth being up
/// to authenticate requests.
pub async fn ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let services = ["auth-service", "patient-service", "doctor-service", "appointment-service", "medical-records-service", "facility-service", "notification-service", "audit-service"];

    let mut statuses = serde_json::Map::new();
    let mut auth_reachable = false;
    for service in services {
        let Some(base_url) = state.registry.pick(service, state.load_balance_strategy) else {
            statuses.insert(service.to_string(), json!("UNKNOWN"));
            continue;
        };
        let reachable = probe(&state.http_client, &base_url).await;
        if service == "auth-service" {
            auth_reachable = reachable;
        }
        statuses.insert(service.to_string(), json!(if reachable { "UP" } else { "DOWN" }));
    }

    let status_code = if auth_reachable { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(json!({"status": if auth_reachable { "UP" } else { "DOWN" }, "services": statuses})))
}

/// Aggregate view combining liveness (always up) with the readiness probe
/// results, for dashboards that want one endpoint to poll.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ready(State(state)).await
}

/// Exposes accumulated counters/histograms in Prometheus text format. The
/// handle is installed once at startup by [`crate::install_metrics_recorder`].
pub async fn metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
