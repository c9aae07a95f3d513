// hospital-system-tests/tests/rate_limit.rs
// ============================================================================
// Aggregates the gateway rate-limiting end-to-end scenario.
// ============================================================================

mod helpers;

#[path = "suites/rate_limit.rs"]
mod rate_limit;
