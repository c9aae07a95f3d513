// hospital-cli/src/handlers/appointments.rs
// ============================================================================
// Module: Appointment Handlers
// Description: Booking, lookup, rescheduling, cancellation, and deletion,
// scoped to the caller's tenant and role.
// Dependencies: axum, hospital-appointments, hospital-core, time
// ============================================================================

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use hospital_appointments::{Appointment, AppointmentStatus};
use hospital_appointments::{CreateAppointmentRequest as CoordinatorCreateRequest, UpdateAppointmentRequest as CoordinatorUpdateRequest};
use hospital_core::HospitalError;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::context::AuthContext;
use crate::state::DomainState;

const ROLE_ADMIN: &str = "admin";
const ROLE_DOCTOR: &str = "doctor";
const ROLE_NURSE: &str = "nurse";

fn parse_rfc3339(value: &str) -> Result<OffsetDateTime, HospitalError> {
    OffsetDateTime::parse(value, &time::format_description::well_known::Rfc3339)
        .map_err(|_| HospitalError::Validation(format!("'{value}' is not a valid RFC3339 timestamp")))
}

/// Returns an error unless the caller may see this appointment: staff roles
/// see every appointment in their tenant, a patient only their own, a
/// doctor only appointments booked with them.
fn require_visibility(auth: &AuthContext, appointment: &Appointment) -> Result<(), HospitalError> {
    if auth.has_role(ROLE_ADMIN) || auth.has_role(ROLE_NURSE) {
        return Ok(());
    }
    if auth.has_role(ROLE_DOCTOR) && appointment.doctor_id == auth.user_id {
        return Ok(());
    }
    if appointment.patient_id == auth.user_id {
        return Ok(());
    }
    Err(HospitalError::Forbidden("not permitted to view this appointment".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentRequest {
    pub patient_id: String,
    pub doctor_id: String,
    pub appointment_date: String,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateAppointmentRequest {
    pub appointment_date: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelQuery {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    #[serde(rename = "hoursAhead")]
    pub hours_ahead: i64,
}

#[derive(Debug, Serialize)]
pub struct AppointmentList {
    pub appointments: Vec<Appointment>,
}

/// `POST /api/appointments`.
///
/// # Errors
///
/// Returns [`HospitalError::NotFound`] when the patient/doctor have no
/// snapshot, [`HospitalError::Validation`] for a specialty mismatch or a
/// past date, and [`HospitalError::Conflict`] on a double-booking.
pub async fn create(
    State(state): State<Arc<DomainState>>,
    auth: AuthContext,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(axum::http::StatusCode, Json<Appointment>), HospitalError> {
    if !auth.has_role(ROLE_ADMIN) && !auth.has_role(ROLE_NURSE) && request.patient_id != auth.user_id {
        return Err(HospitalError::Forbidden("cannot book an appointment for another patient".to_string()));
    }
    let appointment_date = parse_rfc3339(&request.appointment_date)?;
    let appointment = state
        .appointments
        .create(CoordinatorCreateRequest {
            tenant_id: auth.tenant_id.clone(),
            patient_id: request.patient_id,
            doctor_id: request.doctor_id,
            appointment_date,
            reason: request.reason,
        })
        .await?;
    Ok((axum::http::StatusCode::CREATED, Json(appointment)))
}

/// `GET /api/appointments/{id}`.
///
/// # Errors
///
/// Returns [`HospitalError::NotFound`] when no such appointment exists in
/// the caller's tenant, and [`HospitalError::Forbidden`] when the caller may
/// not view it.
pub async fn get(
    State(state): State<Arc<DomainState>>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<Json<Appointment>, HospitalError> {
    let appointment = state
        .appointments
        .get(&auth.tenant_id, &id)
        .await?
        .ok_or_else(|| HospitalError::NotFound(format!("appointment {id} not found")))?;
    require_visibility(&auth, &appointment)?;
    Ok(Json(appointment))
}

/// `GET /api/appointments/patient/{id}`.
///
/// # Errors
///
/// Returns [`HospitalError::Forbidden`] when a patient requests another
/// patient's schedule.
pub async fn list_by_patient(
    State(state): State<Arc<DomainState>>,
    auth: AuthContext,
    Path(patient_id): Path<String>,
) -> Result<Json<AppointmentList>, HospitalError> {
    if !auth.has_role(ROLE_ADMIN) && !auth.has_role(ROLE_NURSE) && !auth.has_role(ROLE_DOCTOR) && patient_id != auth.user_id {
        return Err(HospitalError::Forbidden("cannot view another patient's appointments".to_string()));
    }
    let appointments = state.appointments.list_by_patient(&auth.tenant_id, &patient_id).await?;
    Ok(Json(AppointmentList { appointments }))
}

/// `GET /api/appointments/doctor/{id}`.
///
/// # Errors
///
/// Returns [`HospitalError::Forbidden`] when a doctor requests another
/// doctor's schedule.
pub async fn list_by_doctor(
    State(state): State<Arc<DomainState>>,
    auth: AuthContext,
    Path(doctor_id): Path<String>,
) -> Result<Json<AppointmentList>, HospitalError> {
    let self_match = auth.has_role(ROLE_DOCTOR) && doctor_id == auth.user_id;
    if !auth.has_role(ROLE_ADMIN) && !auth.has_role(ROLE_NURSE) && !self_match {
        return Err(HospitalError::Forbidden("cannot view another doctor's appointments".to_string()));
    }
    let appointments = state.appointments.list_by_doctor(&auth.tenant_id, &doctor_id).await?;
    Ok(Json(AppointmentList { appointments }))
}

/// `GET /api/appointments/status/{status}`, staff-only.
///
/// # Errors
///
/// Returns [`HospitalError::Forbidden`] for patients/doctors and
/// [`HospitalError::Validation`] for an unrecognized status.
pub async fn list_by_status(
    State(state): State<Arc<DomainState>>,
    auth: AuthContext,
    Path(status): Path<String>,
) -> Result<Json<AppointmentList>, HospitalError> {
    if !auth.has_role(ROLE_ADMIN) && !auth.has_role(ROLE_NURSE) {
        return Err(HospitalError::Forbidden("only staff may list appointments by status".to_string()));
    }
    let status = parse_status(&status)?;
    let appointments = state.appointments.list_by_status(&auth.tenant_id, status).await?;
    Ok(Json(AppointmentList { appointments }))
}

/// `GET /api/appointments/upcoming?hoursAhead=N`, staff-only.
///
/// # Errors
///
/// Returns [`HospitalError::Forbidden`] for patients/doctors.
pub async fn list_upcoming(
    State(state): State<Arc<DomainState>>,
    auth: AuthContext,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<AppointmentList>, HospitalError> {
    if !auth.has_role(ROLE_ADMIN) && !auth.has_role(ROLE_NURSE) {
        return Err(HospitalError::Forbidden("only staff may list upcoming appointments".to_string()));
    }
    let appointments = state.appointments.list_upcoming(&auth.tenant_id, query.hours_ahead).await?;
    Ok(Json(AppointmentList { appointments }))
}

/// `PUT /api/appointments/{id}`.
///
/// # Errors
///
/// Returns [`HospitalError::NotFound`], [`HospitalError::Validation`] for a
/// past rescheduled date, or [`HospitalError::Conflict`] on a double-booking.
pub async fn update(
    State(state): State<Arc<DomainState>>,
    auth: AuthContext,
    Path(id): Path<String>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, HospitalError> {
    let existing = state
        .appointments
        .get(&auth.tenant_id, &id)
        .await?
        .ok_or_else(|| HospitalError::NotFound(format!("appointment {id} not found")))?;
    require_visibility(&auth, &existing)?;

    let appointment_date = match request.appointment_date {
        Some(raw) => Some(parse_rfc3339(&raw)?),
        None => None,
    };

    let appointment = state
        .appointments
        .update(
            &auth.tenant_id,
            &id,
            CoordinatorUpdateRequest {
                appointment_date,
                reason: request.reason,
                notes: request.notes,
            },
        )
        .await?;
    Ok(Json(appointment))
}

/// `POST /api/appointments/{id}/cancel?reason=...`.
///
/// # Errors
///
/// Returns [`HospitalError::NotFound`] when the appointment does not exist,
/// and [`HospitalError::Validation`] when it is already in a terminal state.
pub async fn cancel(
    State(state): State<Arc<DomainState>>,
    auth: AuthContext,
    Path(id): Path<String>,
    Query(query): Query<CancelQuery>,
) -> Result<Json<Appointment>, HospitalError> {
    let existing = state
        .appointments
        .get(&auth.tenant_id, &id)
        .await?
        .ok_or_else(|| HospitalError::NotFound(format!("appointment {id} not found")))?;
    require_visibility(&auth, &existing)?;
    let _ = query.reason;

    let appointment = state.appointments.cancel(&auth.tenant_id, &id).await?;
    Ok(Json(appointment))
}

/// `DELETE /api/appointments/{id}`, staff-only hard delete.
///
/// # Errors
///
/// Returns [`HospitalError::Forbidden`] for non-staff callers and
/// [`HospitalError::NotFound`] when the appointment does not exist.
pub async fn delete(
    State(state): State<Arc<DomainState>>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<axum::http::StatusCode, HospitalError> {
    if !auth.has_role(ROLE_ADMIN) {
        return Err(HospitalError::Forbidden("only an admin may delete an appointment".to_string()));
    }
    state.appointments.delete(&auth.tenant_id, &id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

fn parse_status(raw: &str) -> Result<AppointmentStatus, HospitalError> {
    match raw.to_uppercase().as_str() {
        "PENDING" => Ok(AppointmentStatus::Pending),
        "CONFIRMED" => Ok(AppointmentStatus::Confirmed),
        "CANCELLED" => Ok(AppointmentStatus::Cancelled),
        "COMPLETED" => Ok(AppointmentStatus::Completed),
        "NO_SHOW" => Ok(AppointmentStatus::NoShow),
        other => Err(HospitalError::Validation(format!("'{other}' is not a recognized appointment status"))),
    }
}
