// hospital-events/src/broker.rs
// ============================================================================
// Module: In-process Broker
// Description: Default single-binary transport for the event fabric, backed
// by `tokio::sync::broadcast`.
// Dependencies: async-trait, hospital-core, tokio, tracing
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use hospital_core::EventEnvelope;
use tokio::sync::broadcast;

use crate::contracts::{Consumer, DeadLetterSink, ProcessedEventLedger, Publisher};
use crate::error::EventError;

/// Capacity of the internal broadcast channel. Slow consumers that fall more
/// than this many events behind miss the oldest ones (`broadcast::Receiver`
/// semantics); this is acceptable for cache-invalidation and audit fan-out,
/// which both also read from the durable event log on catch-up.
const CHANNEL_CAPACITY: usize = 1024;

/// A `tokio::sync::broadcast`-backed [`Publisher`]. Every
/// [`InProcessBroker::subscribe`] call spawns a task that drains its own
/// receiver, checks the idempotency ledger, dispatches to the consumer,
/// redelivers once on failure, and routes a second failure to the
/// dead-letter sink.
pub struct InProcessBroker {
    sender: broadcast::Sender<EventEnvelope>,
}

impl InProcessBroker {
    /// Builds a broker with the default channel capacity.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Registers a consumer under `consumer_group`, spawning a background
    /// task that processes every event for the life of the returned handle.
    /// Dropping the handle's `JoinHandle` does not stop the task; callers
    /// that need graceful shutdown should abort it explicitly.
    pub fn subscribe(
        &self,
        consumer_group: impl Into<String>,
        consumer: Arc<dyn Consumer>,
        ledger: Arc<dyn ProcessedEventLedger>,
        dead_letters: Arc<dyn DeadLetterSink>,
    ) -> tokio::task::JoinHandle<()> {
        let consumer_group = consumer_group.into();
        let mut receiver = self.sender.subscribe();
        tokio::spawn(async move {
            loop {
                let envelope = match receiver.recv().await {
                    Ok(envelope) => envelope,
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(consumer_group = %consumer_group, skipped, "consumer fell behind, events dropped");
                        continue;
                    }
                };
                if !envelope.has_valid_tenant() {
                    tracing::warn!(event_id = %envelope.event_id, "dropping event with missing tenant");
                    continue;
                }
                if ledger.has_processed(&consumer_group, envelope.event_id).await {
                    continue;
                }
                match consumer.handle(&envelope).await {
                    Ok(()) => ledger.mark_processed(&consumer_group, envelope.event_id).await,
                    Err(first_error) => {
                        tracing::warn!(
                            consumer_group = %consumer_group,
                            event_id = %envelope.event_id,
                            error = %first_error,
                            "consumer failed, redelivering once before dead-lettering"
                        );
                        match consumer.handle(&envelope).await {
                            Ok(()) => ledger.mark_processed(&consumer_group, envelope.event_id).await,
                            Err(err) => dead_letters.record(envelope, err.to_string()).await,
                        }
                    }
                }
            }
        })
    }
}

impl Default for InProcessBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for InProcessBroker {
    async fn publish(&self, envelope: EventEnvelope) -> Result<(), EventError> {
        // `send` only errors when there are zero receivers; that is a valid
        // startup-ordering state (publishers can come up before consumers),
        // not a delivery failure worth surfacing to the caller.
        let _ = self.sender.send(envelope);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::{InMemoryDeadLetterSink, InMemoryProcessedEventLedger};
    use hospital_core::{EventType, TenantId};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::OffsetDateTime;
    use tokio::time::{sleep, Duration};

    struct CountingConsumer {
        count: Arc<AtomicUsize>,
        fail_once: std::sync::atomic::AtomicBool,
    }

    #[async_trait]
    impl Consumer for CountingConsumer {
        async fn handle(&self, _envelope: &EventEnvelope) -> Result<(), EventError> {
            if self.fail_once.swap(false, Ordering::SeqCst) {
                return Err(EventError::DeliveryFailed("simulated failure".to_string()));
            }
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct AlwaysFailingConsumer;

    #[async_trait]
    impl Consumer for AlwaysFailingConsumer {
        async fn handle(&self, _envelope: &EventEnvelope) -> Result<(), EventError> {
            Err(EventError::DeliveryFailed("simulated permanent failure".to_string()))
        }
    }

    fn sample_envelope() -> EventEnvelope {
        EventEnvelope::new(
            EventType::AppointmentCreated,
            OffsetDateTime::UNIX_EPOCH,
            TenantId::new("t1"),
            serde_json::json!({"appointmentId": "a1"}),
        )
    }

    #[tokio::test]
    async fn delivers_published_events_to_subscribed_consumers() {
        let broker = InProcessBroker::new();
        let count = Arc::new(AtomicUsize::new(0));
        let consumer = Arc::new(CountingConsumer {
            count: count.clone(),
            fail_once: std::sync::atomic::AtomicBool::new(false),
        });
        let _handle = broker.subscribe(
            "audit",
            consumer,
            Arc::new(InMemoryProcessedEventLedger::new()),
            Arc::new(InMemoryDeadLetterSink::new()),
        );

        broker.publish(sample_envelope()).await.unwrap();
        sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn routes_consumer_failure_to_the_dead_letter_sink_after_the_redelivery_also_fails() {
        let broker = InProcessBroker::new();
        let dead_letters = Arc::new(InMemoryDeadLetterSink::new());
        let _handle = broker.subscribe(
            "audit",
            Arc::new(AlwaysFailingConsumer),
            Arc::new(InMemoryProcessedEventLedger::new()),
            dead_letters.clone(),
        );

        broker.publish(sample_envelope()).await.unwrap();
        sleep(Duration::from_millis(50)).await;
        assert_eq!(dead_letters.entries().len(), 1);
    }

    #[tokio::test]
    async fn a_single_transient_failure_is_redelivered_and_does_not_dead_letter() {
        let broker = InProcessBroker::new();
        let count = Arc::new(AtomicUsize::new(0));
        let consumer = Arc::new(CountingConsumer {
            count: count.clone(),
            fail_once: std::sync::atomic::AtomicBool::new(true),
        });
        let ledger = Arc::new(InMemoryProcessedEventLedger::new());
        let dead_letters = Arc::new(InMemoryDeadLetterSink::new());
        let envelope = sample_envelope();
        let _handle = broker.subscribe("audit", consumer, ledger.clone(), dead_letters.clone());

        broker.publish(envelope.clone()).await.unwrap();
        sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1, "the redelivery attempt should have succeeded");
        assert!(dead_letters.entries().is_empty(), "a single transient failure must not dead-letter");
        assert!(ledger.has_processed("audit", envelope.event_id).await, "the successful redelivery must mark the ledger");
    }

    #[tokio::test]
    async fn ledger_prevents_redelivered_events_from_reprocessing() {
        let broker = InProcessBroker::new();
        let count = Arc::new(AtomicUsize::new(0));
        let consumer = Arc::new(CountingConsumer {
            count: count.clone(),
            fail_once: std::sync::atomic::AtomicBool::new(false),
        });
        let ledger = Arc::new(InMemoryProcessedEventLedger::new());
        let envelope = sample_envelope();
        ledger.mark_processed("audit", envelope.event_id).await;

        let _handle = broker.subscribe(
            "audit",
            consumer,
            ledger,
            Arc::new(InMemoryDeadLetterSink::new()),
        );
        broker.publish(envelope).await.unwrap();
        sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0, "already-processed event must not redeliver");
    }
}
