//! Per-topic batching publisher.
//!
//! Each topic gets one background task fed through a bounded queue.
//! Messages arriving within the batching policy's count/byte/delay
//! thresholds are grouped into one flush, trading up to `max_delay` of
//! latency for fewer broker round trips.

use crate::PUBLISH_QUEUE_CAPACITY;
use async_nats::jetstream::Context;
use pulse_bus::{BatchingPolicy, TopicName};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

/// Handle to the background publisher task for one topic.
pub(crate) struct TopicPublisher {
    queue: mpsc::Sender<Vec<u8>>,
    task: JoinHandle<()>,
}

impl TopicPublisher {
    /// Spawn the batching task publishing to `subject`.
    pub(crate) fn spawn(
        context: Context,
        topic: TopicName,
        subject: String,
        policy: BatchingPolicy,
    ) -> Self {
        let (queue, inbox) = mpsc::channel(PUBLISH_QUEUE_CAPACITY);
        let task = tokio::spawn(run(context, topic, subject, policy, inbox));
        Self { queue, task }
    }

    /// The queue feeding the task. Sending blocks only when the outbound
    /// buffer is full, never on the network round trip itself.
    pub(crate) fn queue(&self) -> mpsc::Sender<Vec<u8>> {
        self.queue.clone()
    }

    /// Close the queue and wait for the task to flush what is buffered.
    pub(crate) async fn stop(self) -> Result<(), JoinError> {
        drop(self.queue);
        self.task.await
    }
}

async fn run(
    context: Context,
    topic: TopicName,
    subject: String,
    policy: BatchingPolicy,
    mut inbox: mpsc::Receiver<Vec<u8>>,
) {
    loop {
        // A batch opens with the first message and closes on whichever
        // threshold trips first: count, bytes, delay, or queue closure.
        let Some(first) = inbox.recv().await else {
            break;
        };
        let mut bytes = first.len();
        let mut batch = vec![first];
        let mut closed = false;

        let deadline = tokio::time::sleep(policy.max_delay);
        tokio::pin!(deadline);

        while batch.len() < policy.max_messages && bytes < policy.max_bytes {
            tokio::select! {
                _ = &mut deadline => break,
                next = inbox.recv() => match next {
                    Some(payload) => {
                        bytes += payload.len();
                        batch.push(payload);
                    }
                    None => {
                        closed = true;
                        break;
                    }
                },
            }
        }

        flush(&context, &topic, &subject, batch).await;
        if closed {
            break;
        }
    }
    debug!(topic = %topic, "publisher stopped");
}

/// Send every buffered message, then wait for the broker acknowledgments.
///
/// Failures are logged per message; the caller never sees them. Publishing
/// is fire-and-forget above this point.
async fn flush(context: &Context, topic: &TopicName, subject: &str, batch: Vec<Vec<u8>>) {
    let count = batch.len();
    let mut acks = Vec::with_capacity(count);
    for payload in batch {
        match context.publish(subject.to_string(), payload.into()).await {
            Ok(ack) => acks.push(ack),
            Err(error) => warn!(topic = %topic, %error, "failed to publish message"),
        }
    }
    for ack in acks {
        if let Err(error) = ack.await {
            warn!(topic = %topic, %error, "broker did not acknowledge message");
        }
    }
    debug!(topic = %topic, count, "flushed batch");
}
