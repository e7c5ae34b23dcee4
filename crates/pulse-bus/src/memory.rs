//! # In-Memory Transport
//!
//! A synchronous, in-process implementation of the transport port for
//! tests and local runs. Published bytes are delivered straight to the
//! registered receiver in the publishing task; provisioning and
//! acknowledgments are recorded so tests can assert on them.
//!
//! Messages published while no receiver is running are recorded but not
//! delivered; there is no durable replay here.

use crate::error::TransportError;
use crate::event::{SubscriptionName, TopicName};
use crate::transport::{MessageReceiver, Transport};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// In-process transport with provision/ack bookkeeping.
#[derive(Default)]
pub struct InMemoryTransport {
    topics: Mutex<BTreeSet<String>>,
    subscriptions: Mutex<BTreeSet<String>>,
    receivers: tokio::sync::Mutex<HashMap<String, MessageReceiver>>,
    published: Mutex<Vec<(String, Vec<u8>)>>,
    acknowledged: AtomicU64,
}

impl InMemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the topic has been provisioned.
    #[must_use]
    pub fn topic_exists(&self, topic: &str) -> bool {
        lock(&self.topics).contains(topic)
    }

    /// Whether the subscription has been provisioned.
    #[must_use]
    pub fn subscription_exists(&self, subscription: &str) -> bool {
        lock(&self.subscriptions).contains(subscription)
    }

    /// Number of provisioned topics.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        lock(&self.topics).len()
    }

    /// All payloads published to a topic, in publish order.
    #[must_use]
    pub fn published_for(&self, topic: &str) -> Vec<Vec<u8>> {
        lock(&self.published)
            .iter()
            .filter(|(name, _)| name == topic)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    /// Total messages handed to publishers.
    #[must_use]
    pub fn published_count(&self) -> usize {
        lock(&self.published).len()
    }

    /// Total messages acknowledged after delivery.
    #[must_use]
    pub fn acknowledged_count(&self) -> u64 {
        self.acknowledged.load(Ordering::SeqCst)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn ensure_topic(&self, topic: &TopicName) -> Result<(), TransportError> {
        if lock(&self.topics).insert(topic.as_str().to_string()) {
            debug!(topic = %topic, "created topic");
        }
        Ok(())
    }

    async fn ensure_subscription(
        &self,
        topic: &TopicName,
        consumer_group: &str,
    ) -> Result<SubscriptionName, TransportError> {
        let subscription = SubscriptionName::derive(topic, consumer_group);
        if lock(&self.subscriptions).insert(subscription.as_str().to_string()) {
            debug!(subscription = %subscription, "created subscription");
        }
        Ok(subscription)
    }

    async fn do_publish(
        &self,
        topic: &TopicName,
        batch: Vec<Vec<u8>>,
    ) -> Result<(), TransportError> {
        // Clone the receiver out of the map first: a handler that publishes
        // from inside its invocation must not deadlock on the map lock.
        let receiver = self.receivers.lock().await.get(topic.as_str()).cloned();

        for payload in batch {
            lock(&self.published).push((topic.as_str().to_string(), payload.clone()));
            if let Some(ref receiver) = receiver {
                receiver(payload).await;
                // Ack'd whatever the handler did with it.
                self.acknowledged.fetch_add(1, Ordering::SeqCst);
            }
        }
        Ok(())
    }

    async fn do_subscribe(
        &self,
        topic: &TopicName,
        _consumer_group: &str,
        receiver: MessageReceiver,
    ) -> Result<(), TransportError> {
        let mut receivers = self.receivers.lock().await;
        if receivers.contains_key(topic.as_str()) {
            return Err(TransportError::ReceiverExists {
                topic: topic.as_str().to_string(),
            });
        }
        receivers.insert(topic.as_str().to_string(), receiver);
        Ok(())
    }

    async fn do_unsubscribe(&self, topic: &TopicName) {
        self.receivers.lock().await.remove(topic.as_str());
    }

    async fn shutdown(&self) {
        self.receivers.lock().await.clear();
    }
}
