//! NATS JetStream implementation of the transport port.

use crate::provision;
use crate::publisher::TopicPublisher;
use crate::subscriber::TopicReceiver;
use async_nats::jetstream::{self, Context};
use async_trait::async_trait;
use pulse_bus::{
    BatchingPolicy, BusConfig, FlowControlPolicy, MessageReceiver, SubscriptionName, TopicName,
    Transport, TransportError,
};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Transport port implementation over NATS JetStream.
///
/// One publisher task and at most one receiver task exist per topic. Both
/// registries are instance-owned and lock-guarded, so concurrent first use
/// of a topic provisions each resource exactly once; there are no
/// process-wide singletons here.
pub struct NatsTransport {
    context: Context,
    project: String,
    batching: BatchingPolicy,
    flow_control: FlowControlPolicy,
    publishers: Mutex<HashMap<String, TopicPublisher>>,
    receivers: Mutex<HashMap<String, TopicReceiver>>,
}

impl NatsTransport {
    /// Build a transport over an established client with default policies.
    #[must_use]
    pub fn new(client: async_nats::Client, config: &BusConfig) -> Self {
        Self::with_policies(
            client,
            config,
            BatchingPolicy::default(),
            FlowControlPolicy::default(),
        )
    }

    /// Build a transport with explicit batching and flow-control policies.
    ///
    /// The policies apply uniformly to every topic and subscription this
    /// transport touches.
    #[must_use]
    pub fn with_policies(
        client: async_nats::Client,
        config: &BusConfig,
        batching: BatchingPolicy,
        flow_control: FlowControlPolicy,
    ) -> Self {
        Self {
            context: jetstream::new(client),
            project: config.project().to_string(),
            batching,
            flow_control,
            publishers: Mutex::new(HashMap::new()),
            receivers: Mutex::new(HashMap::new()),
        }
    }

    /// Connect to `url` and build a transport with default policies.
    pub async fn connect(url: &str, config: &BusConfig) -> Result<Self, TransportError> {
        let client = async_nats::connect(url)
            .await
            .map_err(|err| TransportError::Provision {
                resource: format!("connection to {url}"),
                reason: err.to_string(),
            })?;
        Ok(Self::new(client, config))
    }
}

#[async_trait]
impl Transport for NatsTransport {
    async fn ensure_topic(&self, topic: &TopicName) -> Result<(), TransportError> {
        provision::ensure_topic(&self.context, &self.project, topic).await?;
        Ok(())
    }

    async fn ensure_subscription(
        &self,
        topic: &TopicName,
        consumer_group: &str,
    ) -> Result<SubscriptionName, TransportError> {
        let stream = provision::ensure_topic(&self.context, &self.project, topic).await?;
        let subscription = SubscriptionName::derive(topic, consumer_group);
        provision::ensure_subscription(&stream, &subscription, &self.flow_control).await?;
        Ok(subscription)
    }

    async fn do_publish(
        &self,
        topic: &TopicName,
        batch: Vec<Vec<u8>>,
    ) -> Result<(), TransportError> {
        let queue = {
            let mut publishers = self.publishers.lock().await;
            if !publishers.contains_key(topic.as_str()) {
                // First publish for this topic: provision it and spawn the
                // batching task. The lock spans the creation, so a
                // concurrent first publish cannot spawn a second task.
                provision::ensure_topic(&self.context, &self.project, topic).await?;
                let subject = provision::subject_for(&self.project, topic);
                let publisher = TopicPublisher::spawn(
                    self.context.clone(),
                    topic.clone(),
                    subject,
                    self.batching.clone(),
                );
                publishers.insert(topic.as_str().to_string(), publisher);
                info!(topic = %topic, "created publisher");
            }
            let Some(publisher) = publishers.get(topic.as_str()) else {
                return Err(TransportError::Publish {
                    topic: topic.as_str().to_string(),
                    reason: "publisher unavailable".to_string(),
                });
            };
            publisher.queue()
        };

        for payload in batch {
            queue
                .send(payload)
                .await
                .map_err(|_| TransportError::Publish {
                    topic: topic.as_str().to_string(),
                    reason: "publisher task stopped".to_string(),
                })?;
        }
        Ok(())
    }

    async fn do_subscribe(
        &self,
        topic: &TopicName,
        consumer_group: &str,
        receiver: MessageReceiver,
    ) -> Result<(), TransportError> {
        let mut receivers = self.receivers.lock().await;
        if receivers.contains_key(topic.as_str()) {
            // The bus registry makes this unreachable; guard anyway.
            return Err(TransportError::ReceiverExists {
                topic: topic.as_str().to_string(),
            });
        }

        let stream = provision::ensure_topic(&self.context, &self.project, topic).await?;
        let subscription = SubscriptionName::derive(topic, consumer_group);
        let consumer =
            provision::ensure_subscription(&stream, &subscription, &self.flow_control).await?;

        let topic_receiver = TopicReceiver::start(
            consumer,
            topic,
            subscription,
            self.flow_control.clone(),
            receiver,
        )
        .await?;
        receivers.insert(topic.as_str().to_string(), topic_receiver);
        Ok(())
    }

    async fn do_unsubscribe(&self, topic: &TopicName) {
        let removed = self.receivers.lock().await.remove(topic.as_str());
        let Some(receiver) = removed else {
            return;
        };
        if let Err(err) = receiver.stop().await {
            warn!(topic = %topic, error = %err, "receiver did not stop cleanly");
        }
    }

    async fn shutdown(&self) {
        // Receivers first, so nothing new arrives while publishers drain
        // their buffers. A failing stop is logged and the rest proceed.
        let receivers: Vec<_> = self.receivers.lock().await.drain().collect();
        for (topic, receiver) in receivers {
            match receiver.stop().await {
                Ok(()) => info!(topic = %topic, "closed subscription"),
                Err(err) => error!(topic = %topic, error = %err, "error shutting down receiver"),
            }
        }

        let publishers: Vec<_> = self.publishers.lock().await.drain().collect();
        for (topic, publisher) in publishers {
            match publisher.stop().await {
                Ok(()) => info!(topic = %topic, "shut down publisher"),
                Err(err) => error!(topic = %topic, error = %err, "error shutting down publisher"),
            }
        }
    }
}
