// hospital-gateway/src/rate_limit.rs
// ============================================================================
// Module: Rate Limiting
// Description: Token-bucket limiter keyed by caller, standing in for a
// Redis-backed counter. Fails open on internal error.
// Dependencies: dashmap, hospital-config
// ============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use dashmap::DashMap;
use hospital_config::GatewayConfig;
use hospital_core::HospitalError;

use crate::auth::HEADER_USER_ID;
use crate::discovery::is_public_path;
use crate::state::AppState;

/// A single caller's bucket: tokens remaining and when it was last topped
/// up. The bucket refills to `burst` once a full window has elapsed, rather
/// than dripping tokens in continuously — simple, and matches the spec's
/// "TTL=60s, burst-1 tokens" counter framing.
#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: u32,
    window_started_at: Instant,
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request admitted; `remaining` tokens left in the current window.
    Allow { remaining: u32 },
    /// Request rejected; retry after `retry_after_seconds`.
    Limited { retry_after_seconds: u64 },
}

/// Per-key token-bucket storage. A `DashMap`-backed default implementation
/// stands in for a Redis counter; the trait lets a real deployment swap in
/// one without touching the pipeline.
pub trait RateLimitStore: Send + Sync {
    /// Consumes one token for `key`, returning the resulting decision.
    ///
    /// # Errors
    ///
    /// Returns an error string when the backing store is unreachable; the
    /// caller must treat this as fail-open, not fail-closed.
    fn consume(&self, key: &str, rpm: u32, burst: u32) -> Result<RateLimitDecision, String>;
}

/// Window length over which `rpm` tokens are granted. The spec's burst
/// counter uses a 60s TTL regardless of the configured requests-per-minute,
/// so a full window is always one minute.
const WINDOW: Duration = Duration::from_secs(60);

/// In-process token-bucket store. One entry per caller key; old entries are
/// never actively evicted, since an idle caller's bucket refills on its own
/// the next time it's touched and idle entries are cheap to keep around.
#[derive(Debug, Default)]
pub struct DashMapRateLimitStore {
    buckets: DashMap<String, Bucket>,
}

impl DashMapRateLimitStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RateLimitStore for DashMapRateLimitStore {
    fn consume(&self, key: &str, _rpm: u32, burst: u32) -> Result<RateLimitDecision, String> {
        let now = Instant::now();
        let mut entry = self.buckets.entry(key.to_string()).or_insert_with(|| Bucket {
            tokens: burst,
            window_started_at: now,
        });

        if now.duration_since(entry.window_started_at) >= WINDOW {
            entry.tokens = burst;
            entry.window_started_at = now;
        }

        if entry.tokens == 0 {
            let elapsed = now.duration_since(entry.window_started_at);
            let retry_after_seconds = WINDOW.saturating_sub(elapsed).as_secs().max(1);
            return Ok(RateLimitDecision::Limited { retry_after_seconds });
        }

        entry.tokens -= 1;
        Ok(RateLimitDecision::Allow { remaining: entry.tokens })
    }
}

/// Resolves the caller key the limiter buckets on: the authenticated user
/// id when present, otherwise the remote address.
#[must_use]
pub fn rate_limit_key(user_id: Option<&str>, remote_addr: &str) -> String {
    user_id.map_or_else(|| remote_addr.to_string(), ToString::to_string)
}

/// Runs the configured limiter for `key`, failing open (allowing the
/// request) and logging a warning if the store itself errors.
#[must_use]
pub fn check(store: &dyn RateLimitStore, config: &GatewayConfig, key: &str) -> RateLimitDecision {
    if !config.rate_limit_enabled {
        return RateLimitDecision::Allow { remaining: config.rate_limit_burst };
    }
    match store.consume(key, config.rate_limit_rpm, config.rate_limit_burst) {
        Ok(decision) => decision,
        Err(reason) => {
            tracing::warn!(key = %key, reason = %reason, "rate limit store unreachable, failing open");
            RateLimitDecision::Allow { remaining: config.rate_limit_burst }
        }
    }
}

/// Rate-limits everything except public paths. Runs before authentication
/// in the pipeline, so the per-caller key can only honor an already-present
/// `X-User-Id` header (an internal trusted caller); an end-user request is
/// keyed by remote address until the auth stage runs.
pub async fn rate_limit(
    State(state): State<Arc<AppState>>,
    ConnectInfo(remote_addr): ConnectInfo<std::net::SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_public_path(&path) {
        return next.run(request).await;
    }

    let user_id = request.headers().get(HEADER_USER_ID).and_then(|value| value.to_str().ok());
    let key = rate_limit_key(user_id, &remote_addr.to_string());

    match check(state.rate_limiter.as_ref(), &state.config, &key) {
        RateLimitDecision::Allow { .. } => next.run(request).await,
        RateLimitDecision::Limited { retry_after_seconds } => {
            metrics::counter!("gateway_rate_limited_total").increment(1);
            let mut response = crate::error::render(&HospitalError::RateLimited, "");
            let headers = response.headers_mut();
            headers.insert("x-ratelimit-limit", HeaderValue::from(state.config.rate_limit_burst));
            headers.insert("x-ratelimit-remaining", HeaderValue::from(0));
            headers.insert("retry-after", HeaderValue::from(retry_after_seconds));
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_burst_then_limits() {
        let store = DashMapRateLimitStore::new();
        for _ in 0..3 {
            let decision = store.consume("caller", 60, 3).unwrap();
            assert!(matches!(decision, RateLimitDecision::Allow { .. }));
        }
        let decision = store.consume("caller", 60, 3).unwrap();
        assert!(matches!(decision, RateLimitDecision::Limited { .. }));
    }

    #[test]
    fn buckets_are_independent_per_key() {
        let store = DashMapRateLimitStore::new();
        store.consume("a", 60, 1).unwrap();
        let decision = store.consume("b", 60, 1).unwrap();
        assert!(matches!(decision, RateLimitDecision::Allow { .. }));
    }

    #[test]
    fn disabled_limiter_always_allows() {
        let store = DashMapRateLimitStore::new();
        let config = GatewayConfig {
            rate_limit_enabled: false,
            rate_limit_rpm: 1,
            rate_limit_burst: 1,
            request_timeout_seconds: 30,
            max_body_bytes: 1024,
        };
        for _ in 0..5 {
            assert!(matches!(check(&store, &config, "caller"), RateLimitDecision::Allow { .. }));
        }
    }
}
