// hospital-gateway/src/router.rs
// ============================================================================
// Module: Router Assembly
// Description: Wires CORS, body limiting, timeout, rate limiting,
// authentication, and the proxy fallback into one axum::Router in the
// pipeline's mandated order.
// Dependencies: axum, metrics-exporter-prometheus, tower, tower-http
// ============================================================================

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::routing::get;
use axum::{middleware, Router};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::authenticate;
use crate::health::{health, live, metrics, ready};
use crate::proxy::proxy;
use crate::rate_limit::rate_limit;
use crate::state::AppState;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Installs the process-wide Prometheus recorder on first call and returns
/// its handle; later calls (e.g. across tests in one binary) return the
/// same handle rather than re-installing.
///
/// # Errors
///
/// Returns the underlying [`BuildError`] if the first installation attempt
/// fails (for example, a global recorder was already installed by something
/// else in the process).
pub fn install_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(METRICS_HANDLE.get_or_init(|| handle).clone())
}

/// Stamps every request with a fresh `X-Request-Id` if the caller didn't
/// already supply one, so every hop in a trace carries the same id.
async fn inject_request_id(mut request: Request, next: middleware::Next) -> axum::response::Response {
    let has_request_id = request.headers().contains_key("x-request-id");
    if !has_request_id {
        let request_id = Uuid::new_v4().to_string();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            request.headers_mut().insert("x-request-id", value);
        }
    }
    next.run(request).await
}

/// Builds the gateway's router in the mandated pipeline order: CORS, body
/// limit, timeout, then (per-request) rate limiting, authentication, header
/// injection, and routing to the resolved downstream service.
///
/// `app_routes` carries routes served in-process by the calling binary (for
/// example hospital-cli's own auth/appointments/audit handlers) rather than
/// proxied to a downstream service. They receive the same rate-limiting and
/// authentication treatment as proxied routes, and are tried before the
/// proxy fallback.
///
/// `metrics_handle` comes from [`install_metrics_recorder`], called once at
/// process startup.
#[must_use]
pub fn build_router(state: Arc<AppState>, metrics_handle: PrometheusHandle, app_routes: Router<Arc<AppState>>) -> Router {
    let max_body_bytes = state.config.max_body_bytes;
    let timeout = Duration::from_secs(state.config.request_timeout_seconds);

    let health_router = Router::new()
        .route("/q/health/live", get(live))
        .route("/q/health/ready", get(ready))
        .route("/q/health", get(health))
        .with_state(state.clone());

    let metrics_router = Router::new().route("/q/metrics", get(metrics)).with_state(metrics_handle);

    let proxied = app_routes
        .fallback(proxy)
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit))
        .with_state(state);

    Router::new()
        .merge(health_router)
        .merge(metrics_router)
        .merge(proxied)
        .layer(middleware::from_fn(inject_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
