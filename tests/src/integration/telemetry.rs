//! # Logging Alongside Publishing
//!
//! The telemetry crate installs one global subscriber; publishing emits
//! through it without interfering with results.

#[cfg(test)]
mod tests {
    use super::super::fixtures::OrderPlaced;
    use bus_telemetry::{init_logging, is_initialized, log_event, TelemetryConfig};
    use parking_lot::Mutex;
    use std::fmt;
    use std::sync::Arc;
    use topic_publisher::{new_publisher, CallContext, InMemoryConnector};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Records `(component, message)` for every event that has a component.
    #[derive(Clone, Default)]
    struct ComponentCapture(Arc<Mutex<Vec<(String, String)>>>);

    #[derive(Default)]
    struct EventFields {
        component: Option<String>,
        message: Option<String>,
    }

    impl Visit for EventFields {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "component" {
                self.component = Some(value.to_string());
            }
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.message = Some(format!("{value:?}"));
            }
        }
    }

    impl<S: Subscriber> Layer<S> for ComponentCapture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut fields = EventFields::default();
            event.record(&mut fields);
            if let Some(component) = fields.component {
                self.0
                    .lock()
                    .push((component, fields.message.unwrap_or_default()));
            }
        }
    }

    impl ComponentCapture {
        fn saw(&self, component: &str, message: &str) -> bool {
            self.0
                .lock()
                .iter()
                .any(|(c, m)| c == component && m == message)
        }
    }

    #[tokio::test]
    async fn test_publish_with_logging_installed() {
        let config = TelemetryConfig {
            log_level: "topic_publisher=debug,info".into(),
            ..TelemetryConfig::for_service("bus-tests")
        };
        // Other tests in this binary may have installed it already.
        init_logging(&config).unwrap();
        assert!(is_initialized());

        let connector = InMemoryConnector::new();
        let ctx = CallContext::background();
        let publisher = new_publisher(&ctx, &connector, "orders", Vec::new())
            .await
            .unwrap();

        publisher
            .publish(&ctx, &OrderPlaced::new("C-1", 1), &[])
            .await
            .unwrap();
        log_event!(info, "bus-tests", "Order published", topic = publisher.topic_name());

        let again = init_logging(&config).unwrap();
        assert!(!again.installed);
    }

    #[tokio::test]
    async fn test_core_events_carry_component() {
        let capture = ComponentCapture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());
        let _guard = tracing::subscriber::set_default(subscriber);

        let connector = InMemoryConnector::new();
        let ctx = CallContext::background();
        let publisher = new_publisher(&ctx, &connector, "orders", Vec::new())
            .await
            .unwrap();
        publisher
            .publish(&ctx, &OrderPlaced::new("C-1", 1), &[])
            .await
            .unwrap();

        assert!(capture.saw("namespace", "Resolving namespace"));
        assert!(capture.saw("provisioner", "Topic created"));
        assert!(capture.saw("builder", "Publisher ready"));
        assert!(capture.saw("publisher", "Sending message"));
    }
}
