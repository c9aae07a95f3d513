// hospital-identity/src/lib.rs
// ============================================================================
// Module: Hospital Identity
// Description: Tenant-scoped user store: registration, password lifecycle,
// and the login lockout state machine.
// Purpose: Own the `User` entity and its store-agnostic operations.
// Dependencies: argon2, hospital-core, rand, time, tracing, uuid
// ============================================================================

//! ## Overview
//! `IdentityStore` is the trait boundary every caller (the gateway's public
//! login/register endpoints, tests) depends on; [`MemoryIdentityStore`] is
//! the default in-process implementation. A durable `rusqlite`-backed
//! implementation lives in `hospital-store-sqlite` to keep this crate free of
//! a storage-engine dependency, the same split the teacher uses between
//! `decision-gate-core`'s traits and `decision-gate-store-sqlite`'s
//! implementation.

mod memory;
mod password;
mod store;
mod user;

pub use memory::MemoryIdentityStore;
pub use password::{PasswordPolicyError, hash_password, validate_password_policy, verify_password};
pub use store::IdentityStore;
pub use user::User;
