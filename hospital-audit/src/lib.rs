// hospital-audit/src/lib.rs
// ============================================================================
// Module: Hospital Audit
// Description: Idempotent, append-only audit journal built from the domain
// event stream.
// Purpose: Give every tenant a queryable record of who did what, built
// entirely from events already flowing through the fabric — no write-path
// component calls the journal directly.
// Dependencies: async-trait, dashmap, hospital-core, hospital-events, serde,
// serde_json, time, tracing, uuid
// ============================================================================

//! ## Overview
//! [`AuditConsumer`] subscribes to the event fabric and journals one
//! [`AuditEntry`] per distinct `event_id`; [`AuditStore`] is the persistence
//! boundary, upserting on `event_id` so a redelivered event never
//! double-journals.

mod consumer;
mod model;
mod store;

pub use consumer::AuditConsumer;
pub use model::AuditEntry;
pub use store::{AuditStore, InMemoryAuditStore};
