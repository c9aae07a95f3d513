// hospital-events/src/topology.rs
// ============================================================================
// Module: Event Topology
// Description: Exchange/queue/routing-key naming, modeled on the teacher's
// dispatch-target naming in `decision-gate-broker`.
// Dependencies: hospital-core
// ============================================================================

use hospital_core::EventType;

/// The exchange an event is published to. Topic exchanges fan out domain
/// events by routing key; the CDC exchange is direct, one queue per
/// consumer, for snapshot projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    /// Topic-style fanout for domain events (`"<aggregate>.<verb>"` routing).
    Domain,
    /// Direct delivery for change-data-capture style cache invalidation.
    ChangeDataCapture,
}

impl Exchange {
    /// The exchange name used when wiring a real broker implementation.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Domain => "hospital.domain",
            Self::ChangeDataCapture => "hospital.cdc",
        }
    }
}

/// A named queue bound to one consumer and one family of event types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queue {
    pub name: String,
    pub consumer_group: String,
}

impl Queue {
    /// Builds a queue name as `"<consumer_group>.<purpose>"`.
    #[must_use]
    pub fn new(consumer_group: impl Into<String>, purpose: impl Into<String>) -> Self {
        let consumer_group = consumer_group.into();
        let purpose = purpose.into();
        Self {
            name: format!("{consumer_group}.{purpose}"),
            consumer_group,
        }
    }
}

/// `"<aggregate>.<verb>"`, derived from an [`EventType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingKey(String);

impl RoutingKey {
    /// Builds the routing key for an event type.
    #[must_use]
    pub fn for_event(event_type: EventType) -> Self {
        Self(event_type.routing_key().to_string())
    }

    /// Returns the routing key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_name_combines_group_and_purpose() {
        let queue = Queue::new("audit", "ledger");
        assert_eq!(queue.name, "audit.ledger");
    }

    #[test]
    fn routing_key_matches_the_event_type() {
        let key = RoutingKey::for_event(EventType::AppointmentCreated);
        assert_eq!(key.as_str(), "appointment.created");
    }
}
