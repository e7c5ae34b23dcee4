//! # Pulse Bus - Typed Event Bus over Pub/Sub Transports
//!
//! Producers publish strongly-typed domain events; at most one handler per
//! event type consumes them. The actual delivery substrate lives behind the
//! [`Transport`] port, so a managed broker can be swapped in or out without
//! touching caller code.
//!
//! ## Publish/Subscribe Flow
//!
//! ```text
//! ┌──────────────┐                       ┌──────────────┐
//! │   Producer   │                       │   Handler    │
//! │              │  publish(event)       │              │
//! └──────┬───────┘                       └──────▲───────┘
//!        │ encode                               │ decode + invoke
//!        ▼                                      │
//! ┌─────────────────────────────────────────────┴──────┐
//! │                  PubSubEventBus                    │
//! │   registry: one handler per event type identity    │
//! └──────┬─────────────────────────────────────▲───────┘
//!        │ do_publish                          │ receiver
//!        ▼                                     │
//! ┌────────────────────────────────────────────┴───────┐
//! │                   Transport port                   │
//! │  topics · subscriptions · batching · flow control  │
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! ## Delivery Contract
//!
//! - **At-least-once, no redelivery:** every delivered message is
//!   acknowledged after the handler returns, whether handling succeeded or
//!   not. Failures are logged against the subscription, never retried.
//! - **Single handler per type:** a second `subscribe` for an already
//!   registered event type fails with [`BusError::ConflictingSubscriber`];
//!   the first registration stays active.
//! - **No ordering across event types**, and none across concurrent
//!   publishers beyond best-effort batch arrival order.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod bus;
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod memory;
pub mod pubsub;
pub mod testing;
pub mod transport;

// Re-export main types
pub use bus::EventBus;
pub use config::{BatchingPolicy, BusConfig, FlowControlPolicy};
pub use error::{BusError, ConfigError, TransportError};
pub use event::{DomainEvent, SubscriptionName, TopicName};
pub use handler::EventHandler;
pub use memory::InMemoryTransport;
pub use pubsub::PubSubEventBus;
pub use testing::{RecordedEventError, SynchronousEventBus};
pub use transport::{MessageReceiver, Transport};
