// hospital-snapshots/src/lib.rs
// ============================================================================
// Module: Hospital Snapshots
// Description: Read-optimized patient/doctor fact projections maintained
// from domain events, plus cache invalidation broadcast.
// Purpose: Give the Appointment Coordinator local, eventually-consistent
// reads with no synchronous cross-service calls.
// Dependencies: async-trait, dashmap, hospital-core, hospital-events,
// tracing
// ============================================================================

//! ## Overview
//! `SnapshotStore<T>` is the generic projection table, `DashMap`-backed,
//! keyed by origin id, last-write-wins. [`PatientFactsConsumer`] and
//! [`DoctorFactsConsumer`] apply the create/update/upsert-on-update-miss/
//! delete rules from the event stream; [`CacheInvalidationBus`] re-publishes
//! a `cache.invalidate` event over C4 after every snapshot change.

mod bus;
mod consumer;
mod model;
mod store;

pub use bus::CacheInvalidationBus;
pub use consumer::{DoctorFactsConsumer, PatientFactsConsumer};
pub use model::{CacheInvalidatePayload, DoctorFacts, PatientFacts};
pub use store::{DashMapSnapshotStore, SnapshotStore};
