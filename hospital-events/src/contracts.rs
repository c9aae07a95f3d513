// hospital-events/src/contracts.rs
// ============================================================================
// Module: Event Contracts
// Description: Publisher/Consumer seam, the idempotency ledger, and the
// dead-letter sink, renamed and adapted from the teacher's Source/Sink split
// in `decision-gate-broker`.
// Dependencies: async-trait, dashmap, hospital-core, tracing, uuid
// ============================================================================

use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashSet;
use hospital_core::EventEnvelope;
use uuid::Uuid;

use crate::error::EventError;

/// Publishes domain events onto the fabric. A real broker (RabbitMQ/Kafka)
/// implements this in production; [`crate::InProcessBroker`] is the default
/// in-binary transport.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes an event. Implementations must not block the caller on
    /// consumer processing; delivery is fire-and-forget to subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::DeliveryFailed`] when the transport itself
    /// rejects the publish (e.g. the channel is closed).
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), EventError>;
}

/// A subscriber that processes one family of event types. Consumers must be
/// idempotent: the fabric may redeliver after a crash mid-processing.
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Handles one event. Returning an error causes the broker to redeliver
    /// the envelope to this same handler once more; a second failure routes
    /// it to the dead-letter sink instead of retrying indefinitely.
    async fn handle(&self, envelope: &EventEnvelope) -> Result<(), EventError>;
}

/// Tracks which event ids have already been processed by a given consumer
/// group, so redelivery after a crash is a no-op rather than a duplicate
/// side effect.
#[async_trait]
pub trait ProcessedEventLedger: Send + Sync {
    /// Returns true when `event_id` has already been recorded as processed
    /// for `consumer_group`.
    async fn has_processed(&self, consumer_group: &str, event_id: Uuid) -> bool;

    /// Records `event_id` as processed for `consumer_group`.
    async fn mark_processed(&self, consumer_group: &str, event_id: Uuid);
}

/// Receives events a consumer failed to process, for operator inspection or
/// replay. Keeping this a trait (rather than just logging) lets a production
/// deployment route dead letters to a real queue.
#[async_trait]
pub trait DeadLetterSink: Send + Sync {
    /// Records a failed delivery.
    async fn record(&self, envelope: EventEnvelope, reason: String);
}

/// `DashSet`-backed idempotency ledger, keyed by `(consumer_group, event_id)`.
#[derive(Debug, Default)]
pub struct InMemoryProcessedEventLedger {
    seen: DashSet<(String, Uuid)>,
}

impl InMemoryProcessedEventLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessedEventLedger for InMemoryProcessedEventLedger {
    async fn has_processed(&self, consumer_group: &str, event_id: Uuid) -> bool {
        self.seen.contains(&(consumer_group.to_string(), event_id))
    }

    async fn mark_processed(&self, consumer_group: &str, event_id: Uuid) {
        self.seen.insert((consumer_group.to_string(), event_id));
    }
}

/// In-memory dead-letter sink; logs via `tracing` and retains entries for
/// inspection in tests and single-binary deployments.
#[derive(Debug, Default)]
pub struct InMemoryDeadLetterSink {
    entries: Mutex<Vec<(EventEnvelope, String)>>,
}

impl InMemoryDeadLetterSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of every recorded dead letter, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<(EventEnvelope, String)> {
        self.entries.lock().map(|guard| guard.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DeadLetterSink for InMemoryDeadLetterSink {
    async fn record(&self, envelope: EventEnvelope, reason: String) {
        tracing::warn!(
            event_id = %envelope.event_id,
            event_type = ?envelope.event_type,
            reason = %reason,
            "event moved to dead-letter sink"
        );
        if let Ok(mut guard) = self.entries.lock() {
            guard.push((envelope, reason));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hospital_core::{EventType, TenantId};
    use time::OffsetDateTime;

    #[tokio::test]
    async fn ledger_tracks_processed_events_per_consumer_group() {
        let ledger = InMemoryProcessedEventLedger::new();
        let event_id = Uuid::new_v4();
        assert!(!ledger.has_processed("audit", event_id).await);
        ledger.mark_processed("audit", event_id).await;
        assert!(ledger.has_processed("audit", event_id).await);
        assert!(!ledger.has_processed("snapshots", event_id).await);
    }

    #[tokio::test]
    async fn dead_letter_sink_retains_recorded_entries() {
        let sink = InMemoryDeadLetterSink::new();
        let envelope = EventEnvelope::new(
            EventType::AppointmentCreated,
            OffsetDateTime::UNIX_EPOCH,
            TenantId::new("t1"),
            serde_json::json!({}),
        );
        sink.record(envelope, "handler panicked".to_string()).await;
        assert_eq!(sink.entries().len(), 1);
    }
}
