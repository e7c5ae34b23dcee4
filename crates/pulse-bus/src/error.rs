//! # Error Types
//!
//! The failure taxonomy of the bus. Only configuration errors, conflicting
//! subscribers and provisioning failures ever reach callers; delivery-time
//! failures are logged at the receiver boundary and the message is
//! acknowledged regardless.

use thiserror::Error;

/// Fatal configuration errors, raised at construction time.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No project/namespace identifier was supplied.
    #[error("project must be defined and non-empty")]
    MissingProject,

    /// No consumer group identifier was supplied.
    #[error("consumer group must be defined and non-empty")]
    MissingConsumerGroup,
}

/// Errors surfaced by a transport implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Topic or subscription provisioning failed for a reason other than
    /// "already exists".
    #[error("failed to provision {resource}: {reason}")]
    Provision { resource: String, reason: String },

    /// The topic's publisher rejected the batch.
    #[error("failed to publish to {topic}: {reason}")]
    Publish { topic: String, reason: String },

    /// The background receiver could not be started.
    #[error("failed to start receiver for {topic}: {reason}")]
    Subscribe { topic: String, reason: String },

    /// A receiver is already running for the topic. The bus registry makes
    /// this unreachable in normal use; transports still guard their own
    /// maps.
    #[error("a receiver is already running for {topic}")]
    ReceiverExists { topic: String },
}

/// Errors surfaced to bus callers.
#[derive(Debug, Error)]
pub enum BusError {
    /// A handler is already registered for the event type. The existing
    /// registration stays active and bus state is unaffected.
    #[error("there already is a subscription for {event_type}")]
    ConflictingSubscriber { event_type: &'static str },

    /// An event could not be encoded for the wire.
    #[error("failed to encode {event_type} event: {source}")]
    Encode {
        event_type: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The transport failed; not retried internally.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
