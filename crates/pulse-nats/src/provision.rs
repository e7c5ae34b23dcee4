//! Idempotent topic and subscription provisioning.
//!
//! Existence checks return an explicit exists/not-found outcome instead of
//! treating broker errors as control flow. Probing and creating race
//! against other processes provisioning the same names concurrently, so a
//! create that loses to "already exists" is treated as success.

use async_nats::jetstream::consumer::{pull, Consumer};
use async_nats::jetstream::context::{
    CreateStreamError, CreateStreamErrorKind, GetStreamError, GetStreamErrorKind,
};
use async_nats::jetstream::ErrorCode;
use async_nats::jetstream::stream::Stream;
use async_nats::jetstream::{self, Context};
use pulse_bus::{FlowControlPolicy, SubscriptionName, TopicName, TransportError};
use tracing::{debug, info};

/// Outcome of a topic existence probe.
enum TopicProbe {
    Exists(Stream),
    NotFound,
}

/// The subject a topic's messages travel on: `<project>.<topic>`.
pub(crate) fn subject_for(project: &str, topic: &TopicName) -> String {
    format!("{project}.{}", topic.as_str())
}

/// JetStream durable names reject `.`, so the logical
/// `<topic>.<consumer-group>` name swaps it for `-` on the wire.
pub(crate) fn durable_name(subscription: &SubscriptionName) -> String {
    subscription.as_str().replace('.', "-")
}

/// Create the topic's stream if it does not exist yet, and return it.
pub(crate) async fn ensure_topic(
    context: &Context,
    project: &str,
    topic: &TopicName,
) -> Result<Stream, TransportError> {
    if let TopicProbe::Exists(stream) = probe_topic(context, topic).await? {
        debug!(topic = %topic, "topic already provisioned");
        return Ok(stream);
    }

    let config = jetstream::stream::Config {
        name: topic.as_str().to_string(),
        subjects: vec![subject_for(project, topic)],
        ..Default::default()
    };

    match context.create_stream(config).await {
        Ok(stream) => {
            info!(topic = %topic, "created topic");
            Ok(stream)
        }
        // Another process created it between the probe and here. The topic
        // exists, which is all we wanted.
        Err(error) if stream_name_in_use(&error) => match probe_topic(context, topic).await? {
            TopicProbe::Exists(stream) => Ok(stream),
            TopicProbe::NotFound => Err(provision_error(topic, "topic vanished mid-creation")),
        },
        Err(error) => Err(provision_error(topic, &error.to_string())),
    }
}

/// Create the durable consumer for a subscription if it does not exist
/// yet, and return it.
pub(crate) async fn ensure_subscription(
    stream: &Stream,
    subscription: &SubscriptionName,
    flow_control: &FlowControlPolicy,
) -> Result<Consumer<pull::Config>, TransportError> {
    let durable = durable_name(subscription);
    let config = pull::Config {
        durable_name: Some(durable.clone()),
        max_ack_pending: i64::try_from(flow_control.max_outstanding_messages).unwrap_or(i64::MAX),
        ..Default::default()
    };

    let consumer = stream
        .get_or_create_consumer(&durable, config)
        .await
        .map_err(|error| TransportError::Provision {
            resource: format!("subscription {subscription}"),
            reason: error.to_string(),
        })?;

    debug!(subscription = %subscription, "subscription provisioned");
    Ok(consumer)
}

async fn probe_topic(context: &Context, topic: &TopicName) -> Result<TopicProbe, TransportError> {
    match context.get_stream(topic.as_str()).await {
        Ok(stream) => Ok(TopicProbe::Exists(stream)),
        Err(error) if stream_not_found(&error) => Ok(TopicProbe::NotFound),
        Err(error) => Err(provision_error(topic, &error.to_string())),
    }
}

fn stream_not_found(error: &GetStreamError) -> bool {
    matches!(
        error.kind(),
        GetStreamErrorKind::JetStream(jserror)
            if jserror.error_code() == ErrorCode::STREAM_NOT_FOUND
    )
}

fn stream_name_in_use(error: &CreateStreamError) -> bool {
    matches!(
        error.kind(),
        CreateStreamErrorKind::JetStream(jserror)
            if jserror.error_code() == ErrorCode::STREAM_NAME_EXIST
    )
}

fn provision_error(topic: &TopicName, reason: &str) -> TransportError {
    TransportError::Provision {
        resource: format!("topic {topic}"),
        reason: reason.to_string(),
    }
}
