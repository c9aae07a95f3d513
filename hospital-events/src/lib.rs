// hospital-events/src/lib.rs
// ============================================================================
// Module: Hospital Events
// Description: The event fabric: typed domain events, exchange/queue
// topology, publisher/consumer contracts, dead-letter handling, and an
// idempotency ledger.
// Purpose: Let every domain crate publish and subscribe without depending
// on a concrete broker.
// Dependencies: async-trait, dashmap, hospital-core, serde_json, thiserror,
// tokio, tracing, uuid
// ============================================================================

//! ## Overview
//! `Publisher` and `Consumer` are the integration seam, the same split the
//! teacher calls `Source`/`Sink` in `decision-gate-broker`, renamed to match
//! this domain's publish/subscribe shape. [`InProcessBroker`] is the default
//! single-binary transport, backed by `tokio::sync::broadcast`; a real
//! broker (RabbitMQ/Kafka) is a drop-in `Publisher`/`Consumer` implementation
//! in production, which is out of scope here.

mod broker;
mod contracts;
mod error;
mod topology;

pub use broker::InProcessBroker;
pub use contracts::{
    Consumer, DeadLetterSink, InMemoryDeadLetterSink, InMemoryProcessedEventLedger,
    ProcessedEventLedger, Publisher,
};
pub use error::EventError;
pub use topology::{Exchange, Queue, RoutingKey};
