//! # Transport Port
//!
//! The abstract capability every concrete transport provides to the bus.
//! Implementations own the broker resources; [`PubSubEventBus`] owns the
//! typed contract and the handler registry.
//!
//! [`PubSubEventBus`]: crate::pubsub::PubSubEventBus

use crate::error::TransportError;
use crate::event::{SubscriptionName, TopicName};
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Callback invoked by a transport for every inbound message.
///
/// The bus builds this closure around the registered handler: decoding,
/// dispatch and failure logging all happen inside. It never fails, so the
/// transport acknowledges unconditionally after it returns.
pub type MessageReceiver =
    Arc<dyn Fn(Vec<u8>) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Abstract capability of a pub/sub transport.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Create the topic if it does not exist yet.
    ///
    /// Idempotent: calling this twice for the same name is a no-op on the
    /// second call. Concurrent creation by another process must be
    /// tolerated as success, not reported as an error.
    async fn ensure_topic(&self, topic: &TopicName) -> Result<(), TransportError>;

    /// Create the durable subscription for a consumer group if it does not
    /// exist yet. Idempotent, like [`ensure_topic`](Transport::ensure_topic).
    ///
    /// Returns the derived `<topic>.<consumer-group>` name.
    async fn ensure_subscription(
        &self,
        topic: &TopicName,
        consumer_group: &str,
    ) -> Result<SubscriptionName, TransportError>;

    /// Hand a batch of encoded messages to the topic's publisher.
    ///
    /// Must not block the caller beyond what the batching policy's delay
    /// threshold implies; per-message broker outcomes are not reported
    /// upstream.
    async fn do_publish(
        &self,
        topic: &TopicName,
        batch: Vec<Vec<u8>>,
    ) -> Result<(), TransportError>;

    /// Start a background receiver bound to the topic's subscription.
    ///
    /// Returns once the receiver reports itself running; the receiver then
    /// runs until explicitly stopped. Every delivered message is
    /// acknowledged after `receiver` returns, whatever happened inside.
    async fn do_subscribe(
        &self,
        topic: &TopicName,
        consumer_group: &str,
        receiver: MessageReceiver,
    ) -> Result<(), TransportError>;

    /// Stop and discard the receiver for a topic, awaiting the in-flight
    /// handler invocation. The broker-side subscription resource is not
    /// deleted. No-op when no receiver is running.
    async fn do_unsubscribe(&self, topic: &TopicName);

    /// Stop all receivers and publishers, best-effort. Per-resource
    /// failures are logged, not raised, so one failing shutdown cannot
    /// prevent the others from proceeding.
    async fn shutdown(&self);
}
