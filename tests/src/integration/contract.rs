//! Bus contract properties: conflicting subscribers, naming, provisioning
//! idempotence, unsubscribe behavior.

#[cfg(test)]
mod tests {
    use pulse_bus::{
        BusConfig, BusError, EventBus, InMemoryTransport, PubSubEventBus, SubscriptionName,
        TopicName, Transport,
    };
    use pulse_events::{UserCreated, UserUpdated, VideoAdded};
    use std::sync::{Arc, Mutex};

    fn transport_bus() -> PubSubEventBus<InMemoryTransport> {
        let config = BusConfig::new("test-project", "test-group").unwrap();
        PubSubEventBus::new(InMemoryTransport::new(), config)
    }

    #[tokio::test]
    async fn test_second_handler_for_same_type_conflicts() {
        let bus = transport_bus();

        bus.subscribe::<UserUpdated, _>(|_: UserUpdated| -> anyhow::Result<()> { Ok(()) })
            .await
            .unwrap();
        let error = bus
            .subscribe::<UserUpdated, _>(|_: UserUpdated| -> anyhow::Result<()> { Ok(()) })
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            BusError::ConflictingSubscriber {
                event_type: "user-updated"
            }
        ));

        // A different event type is unaffected.
        bus.subscribe::<UserCreated, _>(|_: UserCreated| -> anyhow::Result<()> { Ok(()) })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_topic_derivation_is_order_independent() {
        // Publish-then-subscribe and subscribe-then-publish address the
        // same channel: the name depends only on the identity.
        let publish_first = transport_bus();
        publish_first
            .publish(VideoAdded {
                video_id: "v-1".to_string(),
                title: "Tides".to_string(),
            })
            .await
            .unwrap();

        let subscribe_first = transport_bus();
        subscribe_first
            .subscribe::<VideoAdded, _>(|_: VideoAdded| -> anyhow::Result<()> { Ok(()) })
            .await
            .unwrap();

        assert!(publish_first.transport().topic_exists("video-added"));
        assert!(subscribe_first.transport().topic_exists("video-added"));
    }

    #[tokio::test]
    async fn test_provisioning_twice_is_a_noop() {
        let transport = InMemoryTransport::new();
        let topic = TopicName::for_event::<UserUpdated>();

        transport.ensure_topic(&topic).await.unwrap();
        transport.ensure_topic(&topic).await.unwrap();
        assert_eq!(transport.topic_count(), 1);

        let first = transport
            .ensure_subscription(&topic, "search-service")
            .await
            .unwrap();
        let second = transport
            .ensure_subscription(&topic, "search-service")
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.as_str(), "user-updated.search-service");
    }

    #[tokio::test]
    async fn test_subscription_name_scopes_consumer_group() {
        let topic = TopicName::for_event::<UserUpdated>();
        assert_eq!(
            SubscriptionName::derive(&topic, "video-service").as_str(),
            "user-updated.video-service"
        );
        assert_eq!(
            SubscriptionName::derive(&topic, "search-service").as_str(),
            "user-updated.search-service"
        );
    }

    #[tokio::test]
    async fn test_unsubscribe_without_subscription_is_noop() {
        let bus = transport_bus();
        bus.unsubscribe::<UserUpdated>().await;
        bus.unsubscribe::<UserUpdated>().await;
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery_and_frees_the_slot() {
        let bus = transport_bus();
        let seen: Arc<Mutex<Vec<UserUpdated>>> = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe::<UserUpdated, _>(move |event: UserUpdated| -> anyhow::Result<()> {
            sink.lock().unwrap().push(event);
            Ok(())
        })
        .await
        .unwrap();
        bus.unsubscribe::<UserUpdated>().await;

        bus.publish(UserUpdated {
            user: pulse_events::User {
                id: "u-1".to_string(),
                email: None,
                organisation: None,
                is_staff: false,
            },
            organisation: None,
        })
        .await
        .unwrap();

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(bus.transport().acknowledged_count(), 0);

        // The slot is free again.
        bus.subscribe::<UserUpdated, _>(|_: UserUpdated| -> anyhow::Result<()> { Ok(()) })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_clears_registrations() {
        let bus = transport_bus();

        bus.subscribe::<UserUpdated, _>(|_: UserUpdated| -> anyhow::Result<()> { Ok(()) })
            .await
            .unwrap();
        bus.shutdown().await;

        // After shutdown the same type can be registered again.
        bus.subscribe::<UserUpdated, _>(|_: UserUpdated| -> anyhow::Result<()> { Ok(()) })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_publish_batch_lands_every_event_on_one_topic() {
        let bus = transport_bus();

        let events: Vec<VideoAdded> = (0..5)
            .map(|n| VideoAdded {
                video_id: format!("v-{n}"),
                title: format!("Video {n}"),
            })
            .collect();
        bus.publish_batch(events).await.unwrap();

        assert_eq!(bus.transport().published_for("video-added").len(), 5);
        assert_eq!(bus.transport().topic_count(), 1);
    }
}
