// hospital-store-sqlite/src/lib.rs
// ============================================================================
// Module: Hospital SQLite Store
// Description: Durable, single-node store implementations (identity, audit)
// backed by SQLite WAL, used when a process opts out of the in-memory
// reference stores.
// Purpose: Give the identity and audit trait boundaries a production-grade
// backend without coupling either domain crate to a specific database.
// Dependencies: async-trait, hospital-audit, hospital-core,
// hospital-identity, rusqlite, serde_json, thiserror, time, tokio, tracing,
// uuid
// ============================================================================

//! ## Overview
//! [`SqliteIdentityStore`] and [`SqliteAuditStore`] implement the same
//! trait boundaries as their in-memory counterparts
//! (`hospital_identity::IdentityStore`, `hospital_audit::AuditStore`), so
//! swapping one for the other at startup is the only change a deployment
//! needs to make. Every operation runs on a blocking task via
//! `tokio::task::spawn_blocking`, since `rusqlite` is synchronous.

mod audit;
mod error;
mod identity;
mod schema;

pub use audit::SqliteAuditStore;
pub use error::SqliteStoreError;
pub use identity::SqliteIdentityStore;
