// hospital-gateway/src/proxy.rs
// ============================================================================
// Module: Reverse Proxy
// Description: Forwards a request to the resolved downstream service and
// relays its response back verbatim.
// Dependencies: axum, hospital-core, reqwest
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use hospital_core::HospitalError;

use crate::discovery::service_for_path;
use crate::state::AppState;

/// Strips hop-by-hop headers that must not be forwarded as-is, per
/// RFC 7230 §6.1 plus the handful Axum/Hyper manage for us.
fn forwardable_headers(headers: &HeaderMap) -> HeaderMap {
    const HOP_BY_HOP: &[&str] = &["connection", "keep-alive", "proxy-authenticate", "proxy-authorization", "te", "trailer", "transfer-encoding", "upgrade", "host"];
    let mut forwarded = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !HOP_BY_HOP.contains(&name.as_str()) {
            forwarded.insert(name.clone(), value.clone());
        }
    }
    forwarded
}

/// Proxies any request whose path matches an entry in the service-discovery
/// prefix table to one instance of that service, chosen by the configured
/// load-balance strategy. Unknown paths are rejected with 404, unreachable
/// services with 503.
pub async fn proxy(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    let Some(service) = service_for_path(&path) else {
        return crate::error::render(&HospitalError::NotFound(format!("no route for {path}")), "");
    };

    let Some(base_url) = state.registry.pick(service, state.load_balance_strategy) else {
        return crate::error::render(&HospitalError::UpstreamUnavailable(format!("no healthy instance of {service}")), "");
    };

    let target = format!("{base_url}{}", request.uri());
    let method = request.method().clone();
    let headers = forwardable_headers(request.headers());
    let body_bytes = match axum::body::to_bytes(request.into_body(), usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => return crate::error::render(&HospitalError::Unexpected(format!("failed to buffer request body: {error}")), ""),
    };

    let upstream_request = state
        .http_client
        .request(method, &target)
        .headers(headers)
        .body(body_bytes);

    let started_at = Instant::now();
    let outcome = upstream_request.send().await;
    metrics::histogram!("gateway_upstream_duration_seconds", "service" => service).record(started_at.elapsed().as_secs_f64());

    match outcome {
        Ok(upstream_response) => {
            metrics::counter!("gateway_upstream_requests_total", "service" => service, "outcome" => "ok").increment(1);
            relay(upstream_response).await
        }
        Err(error) if error.is_timeout() => {
            metrics::counter!("gateway_upstream_requests_total", "service" => service, "outcome" => "timeout").increment(1);
            crate::error::render(&HospitalError::UpstreamTimeout(format!("{service} timed out")), "")
        }
        Err(error) => {
            metrics::counter!("gateway_upstream_requests_total", "service" => service, "outcome" => "unreachable").increment(1);
            crate::error::render(&HospitalError::UpstreamUnavailable(format!("{service} unreachable: {error}")), "")
        }
    }
}

async fn relay(upstream_response: reqwest::Response) -> Response {
    let status = upstream_response.status();
    let headers = upstream_response.headers().clone();
    let bytes = match upstream_response.bytes().await {
        Ok(bytes) => bytes,
        Err(error) => return crate::error::render(&HospitalError::UpstreamUnavailable(format!("failed to read upstream body: {error}")), ""),
    };

    let mut response = Response::new(Body::from(bytes));
    *response.status_mut() = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    for (name, value) in &headers {
        if name.as_str() != "transfer-encoding" && name.as_str() != "connection" {
            response.headers_mut().insert(name.clone(), value.clone());
        }
    }
    response
}
