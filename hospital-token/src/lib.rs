// hospital-token/src/lib.rs
// ============================================================================
// Module: Hospital Token
// Description: Mints and verifies signed tokens carrying tenant and RBAC
// claims, HS512 or RS256 depending on deployment configuration.
// Purpose: One algorithm per running process, never mixed.
// Dependencies: hospital-core, jsonwebtoken, serde, thiserror, time
// ============================================================================

//! ## Overview
//! [`TokenService`] is built once at startup from a
//! `hospital_config::TokenConfig` and never switches algorithm at runtime.
//! [`AccessClaims`] mirrors the specification's claim set exactly; refresh
//! tokens use the narrower [`RefreshClaims`]. Clock skew is tolerated via
//! `jsonwebtoken`'s leeway, not by hand-rolled time arithmetic.

mod claims;
mod error;
mod service;

pub use claims::{AccessClaims, RefreshClaims};
pub use error::TokenError;
pub use service::{MintRequest, TokenService};
