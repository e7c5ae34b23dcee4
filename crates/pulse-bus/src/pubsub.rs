//! # Transport-Backed Event Bus
//!
//! The single concrete bus type a [`Transport`] is injected into. Owns the
//! one-handler-per-event-type registry and the encode/decode boundary;
//! topic provisioning, batching and acknowledgment live behind the port.

use crate::bus::EventBus;
use crate::config::BusConfig;
use crate::error::BusError;
use crate::event::{DomainEvent, SubscriptionName, TopicName};
use crate::handler::EventHandler;
use crate::transport::{MessageReceiver, Transport};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Event bus delivering through an injected pub/sub transport.
pub struct PubSubEventBus<T: Transport> {
    transport: T,
    config: BusConfig,
    /// Event types with a live registration. Instance-owned, guarded by a
    /// single mutex: of two concurrent first-subscribes, exactly one wins
    /// and the loser gets the conflicting-subscriber failure.
    registrations: Mutex<HashSet<&'static str>>,
}

impl<T: Transport> PubSubEventBus<T> {
    /// Build a bus over `transport`.
    ///
    /// `config` is validated at its own construction; nothing can fail
    /// past that point until the first transport call.
    #[must_use]
    pub fn new(transport: T, config: BusConfig) -> Self {
        Self {
            transport,
            config,
            registrations: Mutex::new(HashSet::new()),
        }
    }

    /// Access the underlying transport, mainly for wiring and tests.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn registrations(&self) -> MutexGuard<'_, HashSet<&'static str>> {
        self.registrations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    async fn start_receiver<E, H>(&self, topic: &TopicName, handler: H) -> Result<(), BusError>
    where
        E: DomainEvent,
        H: EventHandler<E> + 'static,
    {
        self.transport.ensure_topic(topic).await?;
        let subscription = self
            .transport
            .ensure_subscription(topic, self.config.consumer_group())
            .await?;

        let receiver = decode_then_invoke::<E, H>(subscription.clone(), handler);
        self.transport
            .do_subscribe(topic, self.config.consumer_group(), receiver)
            .await?;

        info!(topic = %topic, subscription = %subscription, "subscribed");
        Ok(())
    }
}

#[async_trait]
impl<T: Transport> EventBus for PubSubEventBus<T> {
    async fn subscribe<E, H>(&self, handler: H) -> Result<(), BusError>
    where
        E: DomainEvent,
        H: EventHandler<E> + 'static,
    {
        // Conflicts are checked (and the slot reserved) before any
        // transport call is made.
        if !self.registrations().insert(E::EVENT_TYPE) {
            return Err(BusError::ConflictingSubscriber {
                event_type: E::EVENT_TYPE,
            });
        }

        let topic = TopicName::for_event::<E>();
        let result = self.start_receiver::<E, H>(&topic, handler).await;
        if let Err(ref error) = result {
            // Roll back the reservation so a later subscribe can retry.
            self.registrations().remove(E::EVENT_TYPE);
            warn!(topic = %topic, %error, "subscribe failed");
        }
        result
    }

    async fn publish_batch<E: DomainEvent>(&self, events: Vec<E>) -> Result<(), BusError> {
        if events.is_empty() {
            return Ok(());
        }

        let topic = TopicName::for_event::<E>();
        let mut batch = Vec::with_capacity(events.len());
        for event in &events {
            let encoded = serde_json::to_vec(event).map_err(|source| BusError::Encode {
                event_type: E::EVENT_TYPE,
                source,
            })?;
            batch.push(encoded);
        }

        self.transport.ensure_topic(&topic).await?;
        self.transport.do_publish(&topic, batch).await?;
        debug!(topic = %topic, count = events.len(), "published batch");
        Ok(())
    }

    async fn unsubscribe<E: DomainEvent>(&self) {
        if !self.registrations().remove(E::EVENT_TYPE) {
            debug!(
                event_type = E::EVENT_TYPE,
                "unsubscribe with no active registration"
            );
            return;
        }

        let topic = TopicName::for_event::<E>();
        self.transport.do_unsubscribe(&topic).await;
        info!(topic = %topic, "unsubscribed");
    }

    async fn shutdown(&self) {
        self.registrations().clear();
        self.transport.shutdown().await;
        info!("event bus shut down");
    }
}

/// Wrap a typed handler into the byte-level receiver handed to transports.
///
/// Decode and handler failures are logged against the subscription and the
/// message is acknowledged regardless: an explicit no-redelivery policy,
/// not an accident.
fn decode_then_invoke<E, H>(subscription: SubscriptionName, handler: H) -> MessageReceiver
where
    E: DomainEvent,
    H: EventHandler<E> + 'static,
{
    let handler = Arc::new(handler);
    Arc::new(move |payload: Vec<u8>| {
        let handler = Arc::clone(&handler);
        let subscription = subscription.clone();
        Box::pin(async move {
            let event = match serde_json::from_slice::<E>(&payload) {
                Ok(event) => event,
                Err(error) => {
                    warn!(
                        subscription = %subscription,
                        %error,
                        "failed to decode message; acknowledging anyway"
                    );
                    return;
                }
            };

            let rendered = format!("{event:?}");
            match handler.handle(event).await {
                Ok(()) => {
                    debug!(subscription = %subscription, payload = %rendered, "handled message");
                }
                Err(error) => {
                    warn!(
                        subscription = %subscription,
                        payload = %rendered,
                        %error,
                        "handler failed; acknowledging anyway"
                    );
                }
            }
        })
    })
}
