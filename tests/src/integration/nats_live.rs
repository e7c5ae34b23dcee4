//! Adapter tests against a real broker.
//!
//! These need a JetStream-enabled NATS server on `nats://127.0.0.1:4222`
//! (e.g. `nats-server -js`), so they are ignored by default. Run with
//! `cargo test -p pulse-tests -- --ignored`.

#[cfg(test)]
mod tests {
    use crate::init_tracing;
    use pulse_bus::{BusConfig, EventBus, PubSubEventBus};
    use pulse_events::UserUpdated;
    use pulse_nats::NatsTransport;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const NATS_URL: &str = "nats://127.0.0.1:4222";

    #[tokio::test]
    #[ignore = "requires a JetStream-enabled NATS server"]
    async fn test_round_trip_through_broker() {
        init_tracing();
        let config = BusConfig::new("it", "pulse-tests").unwrap();
        let transport = NatsTransport::connect(NATS_URL, &config).await.unwrap();
        let bus = PubSubEventBus::new(transport, config);

        let seen: Arc<Mutex<Vec<UserUpdated>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        bus.subscribe::<UserUpdated, _>(move |event: UserUpdated| -> anyhow::Result<()> {
            sink.lock().unwrap().push(event);
            Ok(())
        })
        .await
        .unwrap();

        let published = UserUpdated {
            user: pulse_events::User {
                id: "u-live".to_string(),
                email: None,
                organisation: None,
                is_staff: false,
            },
            organisation: None,
        };
        bus.publish(published.clone()).await.unwrap();

        // Delivery crosses the broker; poll until the batching delay and
        // the pull loop have done their work.
        let mut waited = Duration::ZERO;
        loop {
            if !seen.lock().unwrap().is_empty() {
                break;
            }
            assert!(waited < Duration::from_secs(10), "event never arrived");
            tokio::time::sleep(Duration::from_millis(100)).await;
            waited += Duration::from_millis(100);
        }
        assert_eq!(seen.lock().unwrap()[0], published);

        bus.shutdown().await;
    }
}
