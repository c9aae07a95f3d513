// hospital-core/src/clock.rs
// ============================================================================
// Module: Clock
// Description: An injectable source of "now" for deterministic tests.
// Purpose: Keep lockout windows, token expiry, and appointment-date checks
// testable without sleeping real wall-clock time.
// Dependencies: time
// ============================================================================

//! ## Overview
//! Every component that compares against "now" (lockout expiry, token
//! expiry, the future-date invariant on appointments) takes a `&dyn Clock`
//! rather than calling `OffsetDateTime::now_utc()` directly, so tests can
//! supply a fixed or stepped clock.

use std::sync::atomic::{AtomicI64, Ordering};

use time::OffsetDateTime;

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> OffsetDateTime;
}

/// A clock backed by the system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// A clock that can be advanced explicitly, for deterministic tests.
#[derive(Debug)]
pub struct FixedClock {
    unix_seconds: AtomicI64,
}

impl FixedClock {
    /// Creates a clock fixed at the given time.
    #[must_use]
    pub fn at(time: OffsetDateTime) -> Self {
        Self {
            unix_seconds: AtomicI64::new(time.unix_timestamp()),
        }
    }

    /// Advances the clock by the given number of seconds.
    pub fn advance_seconds(&self, seconds: i64) {
        self.unix_seconds.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(self.unix_seconds.load(Ordering::SeqCst))
            .unwrap_or(OffsetDateTime::UNIX_EPOCH)
    }
}
