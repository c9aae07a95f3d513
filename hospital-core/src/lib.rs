// hospital-core/src/lib.rs
// ============================================================================
// Module: Hospital Core
// Description: Shared identifiers, error taxonomy, event envelope, and the
// disease/specialty glossary used across every service in the workspace.
// Dependencies: serde, serde_json, thiserror, time, uuid
// ============================================================================

//! ## Overview
//! `hospital-core` has no knowledge of HTTP, SQL, or message brokers. It
//! defines the vocabulary every other crate shares: tenant-scoped
//! identifiers, the uniform error taxonomy from the error-handling design,
//! the event envelope and routing-key scheme used by the event fabric, and
//! the authoritative disease-to-specialty mapping consulted by the
//! appointment coordinator.

pub mod clock;
pub mod error;
pub mod event;
pub mod ids;
pub mod specialty;

pub use clock::Clock;
pub use error::{FieldError, HospitalError};
pub use event::{EventEnvelope, EventType};
pub use ids::TenantId;
pub use specialty::{Specialty, specialty_for_disease};
