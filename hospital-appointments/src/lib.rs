// hospital-appointments/src/lib.rs
// ============================================================================
// Module: Hospital Appointments
// Description: Booking coordinator enforcing the specialty-match and
// no-double-booking invariants against local snapshots, serializing
// conflicting writes.
// Purpose: Book/cancel/update appointments with no synchronous cross-service
// calls, reading only from the locally replicated snapshots.
// Dependencies: async-trait, dashmap, hospital-core, hospital-events,
// hospital-snapshots, time, tokio, tracing, uuid
// ============================================================================

//! ## Overview
//! [`Appointment`] and its state machine are pure data; [`AppointmentStore`]
//! is the `BTreeMap`-indexed persistence boundary; [`Coordinator`] wires the
//! invariants, the per-`(doctorId, appointmentDate)` serialization, and
//! event publication together.

mod coordinator;
mod model;
mod store;

pub use coordinator::{Coordinator, CreateAppointmentRequest, UpdateAppointmentRequest};
pub use model::{Appointment, AppointmentStatus};
pub use store::{AppointmentStore, InMemoryAppointmentStore};
