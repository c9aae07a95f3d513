// hospital-system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared fixtures for driving a full `hospital-cli::wiring::App`
// through `tower::ServiceExt::oneshot` instead of a bound socket.
// Dependencies: hospital-cli, hospital-config, hospital-core, hospital-events,
// hospital-gateway, tokio, tower
// ============================================================================

#![allow(dead_code)]

pub mod app;
pub mod events;
pub mod http;
pub mod stub_server;
