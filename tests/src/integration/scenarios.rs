//! End-to-end publish/subscribe scenarios across the bus, the in-memory
//! transport, the payload catalogue and the synchronous test double.

#[cfg(test)]
mod tests {
    use crate::init_tracing;
    use pulse_bus::{
        BusConfig, EventBus, InMemoryTransport, PubSubEventBus, RecordedEventError,
        SynchronousEventBus,
    };
    use pulse_events::{
        CollectionInteraction, Order, OrderCreated, Organisation, User, UserUpdated, VideoAdded,
    };
    use std::sync::{Arc, Mutex};

    fn sample_user(id: &str) -> User {
        User {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            organisation: None,
            is_staff: false,
        }
    }

    fn transport_bus() -> PubSubEventBus<InMemoryTransport> {
        let config = BusConfig::new("test-project", "test-group").unwrap();
        PubSubEventBus::new(InMemoryTransport::new(), config)
    }

    /// Scenario A: one subscribed handler sees exactly the published event,
    /// exactly once, after a full encode/decode round trip.
    #[tokio::test]
    async fn test_subscribed_handler_receives_published_event_once() {
        init_tracing();
        let bus = transport_bus();
        let seen: Arc<Mutex<Vec<UserUpdated>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe::<UserUpdated, _>(move |event: UserUpdated| -> anyhow::Result<()> {
            sink.lock().unwrap().push(event);
            Ok(())
        })
        .await
        .unwrap();

        let published = UserUpdated {
            user: sample_user("u-1"),
            organisation: Some(Organisation {
                id: "org-1".to_string(),
                name: "Springfield High".to_string(),
            }),
        };
        bus.publish(published.clone()).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], published);
    }

    /// Scenario B: the synchronous double records events with no handlers
    /// registered at all.
    #[tokio::test]
    async fn test_double_records_events_without_handlers() {
        let bus = SynchronousEventBus::new();

        for n in 0..3 {
            bus.publish(CollectionInteraction {
                collection_id: format!("col-{n}"),
                user: sample_user("u-1"),
                interaction: "BOOKMARK".to_string(),
            })
            .await
            .unwrap();
        }
        bus.publish(VideoAdded {
            video_id: "v-1".to_string(),
            title: "Volcanoes".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(bus.count_events_of_type::<CollectionInteraction>(), 3);
        assert!(bus.has_received_event_of_type::<VideoAdded>());
    }

    /// Scenario C: the exactly-one query fails on zero and on more than one.
    #[tokio::test]
    async fn test_single_event_query_conditions() {
        let bus = SynchronousEventBus::new();

        let error = bus.event_of_type::<OrderCreated>().unwrap_err();
        assert!(matches!(error, RecordedEventError::NoneFound { .. }));

        let order = |id: &str| OrderCreated {
            order: Order {
                id: id.to_string(),
                status: "PLACED".to_string(),
                items: vec![],
            },
        };
        bus.publish(order("o-1")).await.unwrap();
        bus.publish(order("o-2")).await.unwrap();

        let error = bus.event_of_type::<OrderCreated>().unwrap_err();
        assert!(matches!(
            error,
            RecordedEventError::MoreThanOne { count: 2, .. }
        ));
    }

    /// Scenario D: a raising handler does not stop the message from being
    /// acknowledged, and the bus stays usable afterwards.
    #[tokio::test]
    async fn test_failing_handler_still_acknowledges() {
        init_tracing();
        let bus = transport_bus();
        let deliveries = Arc::new(Mutex::new(0usize));

        let count = deliveries.clone();
        bus.subscribe::<VideoAdded, _>(move |_: VideoAdded| -> anyhow::Result<()> {
            *count.lock().unwrap() += 1;
            anyhow::bail!("analysis pipeline is down")
        })
        .await
        .unwrap();

        bus.publish(VideoAdded {
            video_id: "v-1".to_string(),
            title: "Volcanoes".to_string(),
        })
        .await
        .unwrap();

        // Delivered once, acknowledged once, no redelivery attempt.
        assert_eq!(*deliveries.lock().unwrap(), 1);
        assert_eq!(bus.transport().acknowledged_count(), 1);

        bus.publish(VideoAdded {
            video_id: "v-2".to_string(),
            title: "Glaciers".to_string(),
        })
        .await
        .unwrap();

        assert_eq!(*deliveries.lock().unwrap(), 2);
        assert_eq!(bus.transport().acknowledged_count(), 2);
    }

    /// A payload with fields this consumer does not know still decodes and
    /// reaches the handler.
    #[tokio::test]
    async fn test_unknown_fields_survive_delivery() {
        init_tracing();
        let bus = transport_bus();
        let seen: Arc<Mutex<Vec<VideoAdded>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe::<VideoAdded, _>(move |event: VideoAdded| -> anyhow::Result<()> {
            sink.lock().unwrap().push(event);
            Ok(())
        })
        .await
        .unwrap();

        // A newer producer added a field; deliver its bytes directly.
        let payload =
            br#"{"video_id": "v-7", "title": "Tides", "duration_seconds": 314}"#.to_vec();
        use pulse_bus::{TopicName, Transport};
        let topic = TopicName::for_event::<VideoAdded>();
        bus.transport()
            .do_publish(&topic, vec![payload])
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].video_id, "v-7");
    }
}
