//! # Synchronous Test Double
//!
//! An alternate, single-process [`EventBus`]: `publish` invokes the
//! registered handler inline, in the caller's task, before returning, and
//! records every published event for assertions. Nothing is encoded or
//! decoded; values stay in memory as their typed selves.

use crate::bus::EventBus;
use crate::error::BusError;
use crate::event::DomainEvent;
use crate::handler::EventHandler;
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::{info, warn};

/// Failure modes of the single-event queries.
#[derive(Debug, Error)]
pub enum RecordedEventError {
    /// No event of the requested type has been observed.
    #[error("found 0 events matching {event_type}")]
    NoneFound { event_type: &'static str },

    /// More than one event of the requested type has been observed.
    #[error("found more than one ({count}) events matching {event_type}")]
    MoreThanOne {
        event_type: &'static str,
        count: usize,
    },
}

struct RecordedEvent {
    event_type: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

#[async_trait]
trait ErasedHandler: Send + Sync {
    async fn call(&self, event: Arc<dyn Any + Send + Sync>);
}

struct TypedHandler<E, H> {
    handler: H,
    _marker: PhantomData<fn(E)>,
}

#[async_trait]
impl<E, H> ErasedHandler for TypedHandler<E, H>
where
    E: DomainEvent,
    H: EventHandler<E>,
{
    async fn call(&self, event: Arc<dyn Any + Send + Sync>) {
        let Some(event) = event.downcast_ref::<E>() else {
            return;
        };
        if let Err(error) = self.handler.handle(event.clone()).await {
            warn!(event_type = E::EVENT_TYPE, %error, "handler failed");
        }
    }
}

/// Synchronous in-memory event bus for tests.
///
/// Events are recorded whether or not a handler is registered, so a test
/// can publish first and assert later. [`clear_state`] resets the record
/// between scenarios; registrations survive it.
///
/// [`clear_state`]: SynchronousEventBus::clear_state
#[derive(Default)]
pub struct SynchronousEventBus {
    handlers: Mutex<HashMap<&'static str, Arc<dyn ErasedHandler>>>,
    events: Mutex<Vec<RecordedEvent>>,
}

impl SynchronousEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any event of type `E` has been observed.
    #[must_use]
    pub fn has_received_event_of_type<E: DomainEvent>(&self) -> bool {
        self.count_events_of_type::<E>() != 0
    }

    /// The exactly-one observed event of type `E`.
    pub fn event_of_type<E: DomainEvent>(&self) -> Result<E, RecordedEventError> {
        let mut matching = self.events_of_type::<E>();
        match matching.len() {
            1 => Ok(matching.remove(0)),
            0 => Err(RecordedEventError::NoneFound {
                event_type: E::EVENT_TYPE,
            }),
            count => Err(RecordedEventError::MoreThanOne {
                event_type: E::EVENT_TYPE,
                count,
            }),
        }
    }

    /// All observed events of type `E`, in publish order.
    #[must_use]
    pub fn events_of_type<E: DomainEvent>(&self) -> Vec<E> {
        lock(&self.events)
            .iter()
            .filter(|record| record.event_type == E::EVENT_TYPE)
            .filter_map(|record| record.value.downcast_ref::<E>().cloned())
            .collect()
    }

    /// Number of observed events of type `E`.
    #[must_use]
    pub fn count_events_of_type<E: DomainEvent>(&self) -> usize {
        lock(&self.events)
            .iter()
            .filter(|record| record.event_type == E::EVENT_TYPE)
            .count()
    }

    /// Total observed events across all types.
    #[must_use]
    pub fn received_count(&self) -> usize {
        lock(&self.events).len()
    }

    /// Forget every observed event, for isolation between scenarios.
    pub fn clear_state(&self) {
        lock(&self.events).clear();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl EventBus for SynchronousEventBus {
    async fn subscribe<E, H>(&self, handler: H) -> Result<(), BusError>
    where
        E: DomainEvent,
        H: EventHandler<E> + 'static,
    {
        {
            let mut handlers = lock(&self.handlers);
            if handlers.contains_key(E::EVENT_TYPE) {
                return Err(BusError::ConflictingSubscriber {
                    event_type: E::EVENT_TYPE,
                });
            }
            handlers.insert(
                E::EVENT_TYPE,
                Arc::new(TypedHandler::<E, H> {
                    handler,
                    _marker: PhantomData,
                }),
            );
        }
        info!(event_type = E::EVENT_TYPE, "subscribed handler");
        Ok(())
    }

    async fn publish_batch<E: DomainEvent>(&self, events: Vec<E>) -> Result<(), BusError> {
        for event in events {
            let value: Arc<dyn Any + Send + Sync> = Arc::new(event);
            lock(&self.events).push(RecordedEvent {
                event_type: E::EVENT_TYPE,
                value: Arc::clone(&value),
            });

            let handler = lock(&self.handlers).get(E::EVENT_TYPE).cloned();
            if let Some(handler) = handler {
                // Delivered before publish returns, in this very task.
                handler.call(value).await;
            }
            info!(event_type = E::EVENT_TYPE, "published event");
        }
        Ok(())
    }

    async fn unsubscribe<E: DomainEvent>(&self) {
        lock(&self.handlers).remove(E::EVENT_TYPE);
    }

    async fn shutdown(&self) {
        lock(&self.handlers).clear();
    }
}
