// hospital-events/src/error.rs
// ============================================================================
// Module: Event Errors
// Description: Failures publishing or handling an event.
// Dependencies: thiserror
// ============================================================================

use thiserror::Error;

/// Failures from the event fabric.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("no subscribers are registered for this broker")]
    NoSubscribers,
    #[error("failed to deliver event: {0}")]
    DeliveryFailed(String),
    #[error("consumer rejected event {event_id}: {reason}")]
    ConsumerFailed { event_id: uuid::Uuid, reason: String },
}
