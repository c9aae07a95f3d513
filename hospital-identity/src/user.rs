// hospital-identity/src/user.rs
// ============================================================================
// Module: User Entity
// Description: The tenant-scoped user record and its lockout state machine.
// Dependencies: hospital-core, serde, time
// ============================================================================

use hospital_core::ids::{TenantId, UserId};
use hospital_core::Clock;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A tenant-scoped user.
///
/// # Invariants
/// - `(tenant_id, email)` is unique; email is unique per tenant, not globally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub tenant_id: TenantId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub active: bool,
    pub email_verified: bool,
    pub failed_attempts: u32,
    #[serde(with = "time::serde::rfc3339::option")]
    pub locked_until: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub password_changed_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Returns true when the user is currently locked out, per the lockout
    /// state machine: `locked_until` set and still in the future.
    #[must_use]
    pub fn is_locked(&self, clock: &dyn Clock) -> bool {
        self.locked_until.is_some_and(|until| clock.now() < until)
    }

    /// `canLogin = active AND NOT locked`.
    #[must_use]
    pub fn can_login(&self, clock: &dyn Clock) -> bool {
        self.active && !self.is_locked(clock)
    }

    /// Records a successful login: resets the failure counter, clears any
    /// lock, and stamps `last_login_at`.
    pub fn record_successful_login(&mut self, clock: &dyn Clock) {
        self.failed_attempts = 0;
        self.locked_until = None;
        self.last_login_at = Some(clock.now());
        self.updated_at = clock.now();
    }

    /// Records a failed login attempt, locking the account once the
    /// threshold is reached.
    pub fn record_failed_login(
        &mut self,
        clock: &dyn Clock,
        threshold: u32,
        lockout_minutes: u32,
    ) {
        self.failed_attempts += 1;
        if self.failed_attempts >= threshold {
            self.locked_until = Some(clock.now() + time::Duration::minutes(i64::from(lockout_minutes)));
        }
        self.updated_at = clock.now();
    }
}
