//! # Bus Configuration
//!
//! Required identifiers plus the fixed batching and flow-control policies
//! every transport applies uniformly to its topics and subscriptions.

use crate::error::ConfigError;
use std::env;
use std::time::Duration;

/// Configuration required by every transport-backed bus.
#[derive(Debug, Clone)]
pub struct BusConfig {
    project: String,
    consumer_group: String,
}

impl BusConfig {
    /// Validate and build a configuration.
    ///
    /// Both identifiers are required. A missing or empty value is fatal
    /// here, before any transport work happens.
    pub fn new(
        project: impl Into<String>,
        consumer_group: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let project = project.into();
        let consumer_group = consumer_group.into();

        if project.is_empty() {
            return Err(ConfigError::MissingProject);
        }
        if consumer_group.is_empty() {
            return Err(ConfigError::MissingConsumerGroup);
        }

        Ok(Self {
            project,
            consumer_group,
        })
    }

    /// Read configuration from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `PULSE_PROJECT`: project/namespace identifier
    /// - `PULSE_CONSUMER_GROUP`: consumer group identifier
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(
            env::var("PULSE_PROJECT").unwrap_or_default(),
            env::var("PULSE_CONSUMER_GROUP").unwrap_or_default(),
        )
    }

    /// Project/namespace the transport scopes its topics to.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Consumer group identifying this subscriber population.
    #[must_use]
    pub fn consumer_group(&self) -> &str {
        &self.consumer_group
    }
}

/// Outbound batching thresholds, applied uniformly to every topic.
///
/// Messages written within the thresholds are grouped into a single flush,
/// trading up to `max_delay` of added latency for materially fewer broker
/// round trips under load. Not tunable per event type.
#[derive(Debug, Clone)]
pub struct BatchingPolicy {
    /// Flush once this many messages are buffered.
    pub max_messages: usize,
    /// Flush once the buffered payloads reach this many bytes.
    pub max_bytes: usize,
    /// Flush whatever is buffered after this long.
    pub max_delay: Duration,
}

impl Default for BatchingPolicy {
    fn default() -> Self {
        Self {
            max_messages: 200,
            max_bytes: 10_000,
            max_delay: Duration::from_secs(1),
        }
    }
}

/// Inbound flow-control caps, applied uniformly to every subscription.
///
/// Bounds the number and total size of delivered-but-unacknowledged
/// messages, providing backpressure against a slow handler instead of
/// unbounded broker-side buildup.
#[derive(Debug, Clone)]
pub struct FlowControlPolicy {
    /// Maximum outstanding (unacknowledged) message count.
    pub max_outstanding_messages: usize,
    /// Maximum outstanding (unacknowledged) bytes.
    pub max_outstanding_bytes: usize,
}

impl Default for FlowControlPolicy {
    fn default() -> Self {
        Self {
            max_outstanding_messages: 10,
            max_outstanding_bytes: 1024 * 1024,
        }
    }
}
