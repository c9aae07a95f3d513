// hospital-cli/src/router.rs
// ============================================================================
// Module: Domain Router
// Description: Routes this binary serves in-process, built against its own
// `DomainState` then state-erased so `hospital_gateway::build_router` can
// merge them under the shared rate-limit/authentication middleware.
// Dependencies: axum
// ============================================================================

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{appointments, audit, auth};
use crate::state::DomainState;

/// Builds the in-process routes and erases their state, producing a
/// `Router<()>` that converts into any `Router<S>` via axum's blanket
/// `From<Router<()>>` impl, matching the signature
/// `hospital_gateway::build_router` expects for its `app_routes` parameter.
#[must_use]
pub fn domain_router(state: Arc<DomainState>) -> Router<()> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/me", get(auth::me))
        .route("/api/appointments", post(appointments::create))
        .route("/api/appointments/upcoming", get(appointments::list_upcoming))
        .route("/api/appointments/status/:status", get(appointments::list_by_status))
        .route("/api/appointments/patient/:patient_id", get(appointments::list_by_patient))
        .route("/api/appointments/doctor/:doctor_id", get(appointments::list_by_doctor))
        .route("/api/appointments/:id", get(appointments::get).put(appointments::update).delete(appointments::delete))
        .route("/api/appointments/:id/cancel", post(appointments::cancel))
        .route("/api/audit/user/:user_id", get(audit::list_by_user))
        .route("/api/audit/resource/:resource_type/:resource_id", get(audit::list_by_resource))
        .with_state(state)
}
