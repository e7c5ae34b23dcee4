//! # Domain Events
//!
//! The identity convention mapping a typed event to its wire addressing.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// A strongly-typed domain event that can travel over the bus.
///
/// Every payload shape declares a stable string identity, unique per shape.
/// Topic names and durable subscription names are derived from it, so the
/// label must not change across versions: renaming it breaks in-flight
/// subscriptions.
///
/// Payloads are pure data. The serde bounds give the schema-tolerant wire
/// encoding (unknown fields are ignored on decode), `Debug` gives the
/// rendering used when a delivery failure is logged.
pub trait DomainEvent:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Stable identity label for this payload shape (e.g. `user-updated`).
    const EVENT_TYPE: &'static str;
}

/// Name of the logical channel carrying one event shape's messages.
///
/// One topic exists per event type identity, scoped to a project/namespace
/// by the transport. Topics are created lazily on first publish or first
/// subscribe and never deleted by this library.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicName(String);

impl TopicName {
    /// Derive the topic name for an event type.
    ///
    /// A pure function of the identity: publish-then-subscribe and
    /// subscribe-then-publish land on the same channel.
    #[must_use]
    pub fn for_event<E: DomainEvent>() -> Self {
        Self(E::EVENT_TYPE.to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TopicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a durable subscription: `<topic>.<consumer-group>`.
///
/// Scoped to one consumer group over one topic. The subscription resource
/// outlives the in-process receiver; unsubscribing stops the receiver but
/// leaves the broker-side cursor in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionName(String);

impl SubscriptionName {
    /// Derive the subscription name for a topic and consumer group.
    #[must_use]
    pub fn derive(topic: &TopicName, consumer_group: &str) -> Self {
        Self(format!("{}.{consumer_group}", topic.as_str()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriptionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
