// hospital-gateway/src/lib.rs
// ============================================================================
// Module: Hospital Gateway
// Description: The single HTTP entry point: CORS, body limiting, request
// timeout, rate limiting, JWT authentication, header injection, and
// discovery-based routing to backend services.
// Dependencies: axum, dashmap, hospital-config, hospital-core,
// hospital-token, metrics-exporter-prometheus, reqwest, tower, tower-http
// ============================================================================

//! ## Overview
//! Every external request enters through this crate's [`router::build_router`].
//! The pipeline order is fixed: CORS, then body buffering, then a
//! per-request timeout, then (skipping public paths) rate limiting,
//! authentication, and header injection, finishing with service discovery
//! and a reverse proxy to the resolved backend. Serve the returned
//! [`axum::Router`] with `into_make_service_with_connect_info::<std::net::SocketAddr>()`
//! so the rate limiter can read the caller's remote address.

pub mod auth;
pub mod discovery;
pub mod error;
pub mod health;
pub mod proxy;
pub mod rate_limit;
pub mod router;
pub mod state;

pub use router::{build_router, install_metrics_recorder};
pub use state::AppState;
