// hospital-appointments/src/model.rs
// ============================================================================
// Module: Appointment Entity
// Description: The appointment record and its booking state machine.
// Dependencies: hospital-core, serde, time
// ============================================================================

use hospital_core::ids::TenantId;
use hospital_core::HospitalError;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Booking lifecycle state. Transitions are validated by
/// [`AppointmentStatus::can_transition_to`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
    NoShow,
}

impl AppointmentStatus {
    /// `PENDING -> CONFIRMED | CANCELLED`, `CONFIRMED -> COMPLETED |
    /// CANCELLED | NO_SHOW`. Any other transition is rejected.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Completed)
                | (Self::Confirmed, Self::Cancelled)
                | (Self::Confirmed, Self::NoShow)
        )
    }
}

/// A booked appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub tenant_id: TenantId,
    pub patient_id: String,
    pub doctor_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub appointment_date: OffsetDateTime,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub notes: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Appointment {
    /// Applies a status transition, rejecting transitions outside the state
    /// machine.
    ///
    /// # Errors
    ///
    /// Returns [`HospitalError::Validation`] for a disallowed transition.
    pub fn transition_to(&mut self, next: AppointmentStatus, now: OffsetDateTime) -> Result<(), HospitalError> {
        if !self.status.can_transition_to(next) {
            return Err(HospitalError::Validation(format!(
                "cannot transition appointment from {:?} to {:?}",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_may_confirm_or_cancel_only() {
        assert!(AppointmentStatus::Pending.can_transition_to(AppointmentStatus::Confirmed));
        assert!(AppointmentStatus::Pending.can_transition_to(AppointmentStatus::Cancelled));
        assert!(!AppointmentStatus::Pending.can_transition_to(AppointmentStatus::Completed));
    }

    #[test]
    fn confirmed_may_complete_cancel_or_no_show() {
        assert!(AppointmentStatus::Confirmed.can_transition_to(AppointmentStatus::Completed));
        assert!(AppointmentStatus::Confirmed.can_transition_to(AppointmentStatus::Cancelled));
        assert!(AppointmentStatus::Confirmed.can_transition_to(AppointmentStatus::NoShow));
    }

    #[test]
    fn terminal_states_accept_no_further_transitions() {
        assert!(!AppointmentStatus::Cancelled.can_transition_to(AppointmentStatus::Confirmed));
        assert!(!AppointmentStatus::Completed.can_transition_to(AppointmentStatus::Pending));
        assert!(!AppointmentStatus::NoShow.can_transition_to(AppointmentStatus::Confirmed));
    }
}
