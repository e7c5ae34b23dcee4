//! # Event Bus Contract
//!
//! The publish/subscribe contract shared by the transport-backed bus and
//! the synchronous test double.

use crate::error::BusError;
use crate::event::DomainEvent;
use crate::handler::EventHandler;
use async_trait::async_trait;

/// Publish/subscribe contract over strongly-typed domain events.
///
/// At most one handler may be registered per event type; registering a
/// second is a programming error surfaced as
/// [`BusError::ConflictingSubscriber`], not a transient condition.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Register `handler` as the sole consumer for events of type `E`.
    ///
    /// Returns once the underlying receiver reports itself running, i.e.
    /// the topic is being listened to (not once messages have arrived).
    async fn subscribe<E, H>(&self, handler: H) -> Result<(), BusError>
    where
        E: DomainEvent,
        H: EventHandler<E> + 'static;

    /// Publish a single event.
    async fn publish<E: DomainEvent>(&self, event: E) -> Result<(), BusError> {
        self.publish_batch(vec![event]).await
    }

    /// Publish a batch of events of one declared type.
    ///
    /// The batch is homogeneous by construction: a mixed-type batch cannot
    /// be expressed against this signature, so no silent per-type
    /// splitting can occur. Publishing is fire-and-forget with respect to
    /// per-message broker outcomes.
    async fn publish_batch<E: DomainEvent>(&self, events: Vec<E>) -> Result<(), BusError>;

    /// Remove the registration for `E` and stop its receiver.
    ///
    /// Idempotent: unsubscribing a type with no active registration is a
    /// no-op.
    async fn unsubscribe<E: DomainEvent>(&self);

    /// Stop all receivers and publishers and clear every registration.
    ///
    /// Best-effort; per-resource failures are logged and the remaining
    /// resources still shut down.
    async fn shutdown(&self);
}
