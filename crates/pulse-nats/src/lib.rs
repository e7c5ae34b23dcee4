//! # Pulse NATS - JetStream Transport Adapter
//!
//! Implements the [`pulse_bus::Transport`] port over NATS JetStream:
//!
//! - **Topics** map to streams, named by the event type identity; the
//!   stream's single subject is `<project>.<topic>`, scoping the channel to
//!   a project/namespace.
//! - **Subscriptions** map to durable pull consumers, one per
//!   `(topic, consumer group)`.
//! - **Publishing** goes through one lazily-created background task per
//!   topic that groups messages under the batching policy's count/byte/
//!   delay thresholds before flushing.
//! - **Receiving** runs one background task per subscribed topic, bounded
//!   by the flow-control policy, acknowledging every message after the
//!   handler callback returns.
//!
//! Resources are provisioned lazily and idempotently; concurrent
//! provisioning from other processes is tolerated. Shutdown is
//! best-effort: a resource that fails to stop is logged and the rest
//! proceed.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

mod provision;
mod publisher;
mod subscriber;
mod transport;

pub use transport::NatsTransport;

/// Messages a topic's publisher buffers before `do_publish` callers block.
pub const PUBLISH_QUEUE_CAPACITY: usize = 1000;
