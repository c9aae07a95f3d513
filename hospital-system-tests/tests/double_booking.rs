// hospital-system-tests/tests/double_booking.rs
// ============================================================================
// Aggregates the concurrent double-booking end-to-end scenario.
// ============================================================================

mod helpers;

#[path = "suites/double_booking.rs"]
mod double_booking;
