//! # Event Handler
//!
//! The consuming side of a subscription.

use crate::event::DomainEvent;
use async_trait::async_trait;

/// Handles delivered events of a single type.
///
/// A handler failure is logged by the delivering bus and the message is
/// acknowledged anyway; this bus offers no redelivery, so a handler that
/// needs retries must arrange them itself.
#[async_trait]
pub trait EventHandler<E: DomainEvent>: Send + Sync {
    /// Process one delivered event.
    async fn handle(&self, event: E) -> anyhow::Result<()>;
}

/// Plain functions and closures work as handlers.
#[async_trait]
impl<E, F> EventHandler<E> for F
where
    E: DomainEvent,
    F: Fn(E) -> anyhow::Result<()> + Send + Sync,
{
    async fn handle(&self, event: E) -> anyhow::Result<()> {
        self(event)
    }
}
