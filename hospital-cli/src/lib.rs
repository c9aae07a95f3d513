// hospital-cli/src/lib.rs
// ============================================================================
// Module: Hospital Platform Library
// Description: Shared wiring for the hospital-platform binary and its
// system tests — the same component graph either way, just handed a
// `TcpListener` by one caller and a `tower::Service` by the other.
// Dependencies: See wiring module.
// ============================================================================

//! ## Overview
//! The binary entry point (`src/main.rs`) is a thin shell around
//! [`wiring::build_app`]: load config, build the app, bind a socket, serve.
//! `hospital-system-tests` calls the same [`wiring::build_app`] and drives it
//! with `tower::ServiceExt::oneshot` instead, so integration tests exercise
//! the exact router and RBAC seeding the production binary runs.

/// Per-request auth context extracted from a verified token.
pub mod context;
/// HTTP handlers for auth, appointments, and audit read surfaces.
pub mod handlers;
/// In-process route table, merged into the gateway's router.
pub mod router;
/// Constructor-injected handles to every domain component.
pub mod state;
/// Component wiring shared by the binary and the system tests.
pub mod wiring;
