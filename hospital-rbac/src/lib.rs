// hospital-rbac/src/lib.rs
// ============================================================================
// Module: Hospital RBAC
// Description: Effective permission set resolution: roles, permissions,
// resource-level overrides, and a short-lived invalidation-aware cache.
// Purpose: Answer `hasPermission`/`canAccess` without N+1 lookups.
// Dependencies: async-trait, dashmap, hospital-core, parking_lot, time, tracing
// ============================================================================

//! ## Overview
//! [`RoleStore`] is the single joined-lookup trait boundary; [`Resolver`]
//! layers the token-fast-path, role union, and resource-override rules on
//! top of it per the RBAC resolution order. [`PermissionCache`] is an
//! optional short-lived cache in front of a `RoleStore`, invalidated by
//! tenant+user key the same way `hospital-snapshots` invalidates facts.

mod cache;
mod memory;
mod model;
mod resolver;
mod store;

pub use cache::PermissionCache;
pub use memory::MemoryRoleStore;
pub use model::{Permission, Role, RolePermission, UserResourcePermission, UserRole};
pub use resolver::Resolver;
pub use resolver::{AccessList, TokenClaims};
pub use store::{EffectiveGrants, RoleStore};
