//! Per-topic background receiver.
//!
//! One task per subscribed topic pulls from the durable consumer, invokes
//! the bus-provided receiver callback for each message, and acknowledges
//! it whatever the callback did. Messages are processed sequentially; the
//! flow-control policy caps what the broker hands over in one pull.

use async_nats::jetstream::consumer::{pull, Consumer};
use pulse_bus::{FlowControlPolicy, MessageReceiver, SubscriptionName, TopicName, TransportError};
use tokio::sync::{oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

/// Handle to the background receiver task for one subscribed topic.
pub(crate) struct TopicReceiver {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl TopicReceiver {
    /// Spawn the receiver loop and wait until it reports itself running.
    ///
    /// "Running" means the consumer stream is established and the topic is
    /// being listened to; it says nothing about messages having arrived.
    pub(crate) async fn start(
        consumer: Consumer<pull::Config>,
        topic: &TopicName,
        subscription: SubscriptionName,
        flow_control: FlowControlPolicy,
        receiver: MessageReceiver,
    ) -> Result<Self, TransportError> {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let (ready_tx, ready_rx) = oneshot::channel();
        let task = tokio::spawn(run(
            consumer,
            subscription,
            flow_control,
            receiver,
            shutdown_rx,
            ready_tx,
        ));

        match ready_rx.await {
            Ok(Ok(())) => Ok(Self { shutdown, task }),
            Ok(Err(reason)) => Err(TransportError::Subscribe {
                topic: topic.as_str().to_string(),
                reason,
            }),
            Err(_) => Err(TransportError::Subscribe {
                topic: topic.as_str().to_string(),
                reason: "receiver task stopped before reporting ready".to_string(),
            }),
        }
    }

    /// Signal the loop to stop and wait for the in-flight handler
    /// invocation to finish.
    pub(crate) async fn stop(self) -> Result<(), JoinError> {
        let _ = self.shutdown.send(true);
        self.task.await
    }
}

async fn run(
    consumer: Consumer<pull::Config>,
    subscription: SubscriptionName,
    flow_control: FlowControlPolicy,
    receiver: MessageReceiver,
    mut shutdown: watch::Receiver<bool>,
    ready: oneshot::Sender<Result<(), String>>,
) {
    let stream = consumer
        .stream()
        .max_messages_per_batch(flow_control.max_outstanding_messages)
        .max_bytes_per_batch(flow_control.max_outstanding_bytes)
        .messages()
        .await;

    let mut messages = match stream {
        Ok(messages) => messages,
        Err(error) => {
            let _ = ready.send(Err(error.to_string()));
            return;
        }
    };

    let _ = ready.send(Ok(()));
    info!(subscription = %subscription, "receiver running");

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            next = messages.next() => match next {
                Some(Ok(message)) => {
                    receiver(message.payload.to_vec()).await;
                    // Ack'd whatever the handler did with it; this bus does
                    // not redeliver.
                    match message.ack().await {
                        Ok(()) => debug!(subscription = %subscription, "acknowledged message"),
                        Err(error) => {
                            warn!(subscription = %subscription, %error, "failed to acknowledge message");
                        }
                    }
                }
                Some(Err(error)) => {
                    warn!(subscription = %subscription, %error, "receiver stream error");
                }
                None => {
                    warn!(subscription = %subscription, "receiver stream closed by broker");
                    break;
                }
            },
        }
    }

    info!(subscription = %subscription, "receiver stopped");
}
