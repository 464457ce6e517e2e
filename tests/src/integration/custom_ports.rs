//! # Port Implementations Outside the Crate
//!
//! Transports and encoders supplied by the caller plug into the same
//! builder and publisher.

#[cfg(test)]
mod tests {
    use super::super::fixtures::{Heartbeat, OrderPlaced};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde::Serialize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use topic_publisher::{
        with_managed_identity_resource_id, CallContext, CredentialStrategy, InMemoryConnector,
        Namespace, NamespaceConnector, OutgoingMessage, PayloadEncoder, PublisherBuilder,
        PublisherError, TopicEntity, TopicManager, TopicSender, TopicSetting, TransportError,
        TransportErrorKind,
    };

    // =============================================================================
    // TEST DOUBLES
    // =============================================================================

    /// Wraps every payload as `{"data": ...}`.
    struct EnvelopeEncoder;

    impl PayloadEncoder for EnvelopeEncoder {
        fn content_type(&self) -> &str {
            "application/vnd.envelope+json"
        }

        fn encode<T: Serialize + ?Sized>(
            &self,
            payload: &T,
        ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
            #[derive(Serialize)]
            struct Envelope<'a, T: ?Sized> {
                data: &'a T,
            }
            Ok(serde_json::to_vec(&Envelope { data: payload })?)
        }
    }

    /// Fails the first `failures` connects, then delegates.
    struct FlakyConnector {
        inner: InMemoryConnector,
        failures: AtomicUsize,
    }

    #[async_trait]
    impl NamespaceConnector for FlakyConnector {
        async fn connect(
            &self,
            ctx: &CallContext,
            strategy: &CredentialStrategy,
        ) -> Result<Arc<dyn Namespace>, TransportError> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(TransportError::unavailable("identity endpoint warming up"));
            }
            self.inner.connect(ctx, strategy).await
        }
    }

    /// Namespace whose topic lookups are always refused.
    struct LockedNamespace {
        puts: Arc<AtomicUsize>,
    }

    struct LockedManager {
        puts: Arc<AtomicUsize>,
    }

    struct RecordingSender {
        sent: Mutex<Vec<OutgoingMessage>>,
    }

    impl Namespace for LockedNamespace {
        fn name(&self) -> &str {
            "locked"
        }

        fn topic_manager(&self) -> Arc<dyn TopicManager> {
            Arc::new(LockedManager {
                puts: Arc::clone(&self.puts),
            })
        }

        fn topic(&self, _name: &str) -> Result<Arc<dyn TopicSender>, TransportError> {
            Ok(Arc::new(RecordingSender {
                sent: Mutex::new(Vec::new()),
            }))
        }
    }

    #[async_trait]
    impl TopicManager for LockedManager {
        async fn get(&self, _ctx: &CallContext, _name: &str) -> Result<TopicEntity, TransportError> {
            Err(TransportError::rejected("listing denied by policy"))
        }

        async fn put(
            &self,
            _ctx: &CallContext,
            name: &str,
            settings: &[TopicSetting],
        ) -> Result<TopicEntity, TransportError> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            Ok(TopicEntity::new(name, settings.to_vec()))
        }
    }

    #[async_trait]
    impl TopicSender for RecordingSender {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, _ctx: &CallContext, message: OutgoingMessage) -> Result<(), TransportError> {
            self.sent.lock().push(message);
            Ok(())
        }
    }

    // =============================================================================
    // TESTS
    // =============================================================================

    #[tokio::test]
    async fn test_custom_encoder_shapes_body() {
        let connector = InMemoryConnector::new();
        let ctx = CallContext::background();

        let publisher = PublisherBuilder::new("heartbeats")
            .encoder(EnvelopeEncoder)
            .build(&ctx, &connector)
            .await
            .unwrap();

        publisher
            .publish(&ctx, &Heartbeat { sequence: 9 }, &[])
            .await
            .unwrap();

        let ns = connector
            .namespace(InMemoryConnector::AMBIENT_NAMESPACE)
            .unwrap();
        let message = &ns.sent("heartbeats")[0];
        assert_eq!(message.content_type, "application/vnd.envelope+json");
        assert_eq!(message.body_str(), Some(r#"{"data":{"sequence":9}}"#));
        assert_eq!(message.type_tag(), Some("Heartbeat"));
    }

    #[tokio::test]
    async fn test_retry_transient_connect() {
        let connector = FlakyConnector {
            inner: InMemoryConnector::new(),
            failures: AtomicUsize::new(2),
        };
        let ctx = CallContext::background();
        let options = vec![with_managed_identity_resource_id(
            "acme",
            "/subscriptions/1/resourceGroups/rg/providers/identity",
        )];

        let mut attempts = 0;
        let publisher = loop {
            attempts += 1;
            match PublisherBuilder::new("orders")
                .options(options.clone())
                .build(&ctx, &connector)
                .await
            {
                Ok(p) => break p,
                Err(e) if e.is_transient() && attempts < 5 => continue,
                Err(e) => panic!("gave up after {attempts} attempts: {e}"),
            }
        };

        assert_eq!(attempts, 3);
        assert_eq!(publisher.namespace().name(), "acme");
        publisher
            .publish(&ctx, &OrderPlaced::new("C-3", 3), &[])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_refused_lookup_never_creates() {
        let puts = Arc::new(AtomicUsize::new(0));
        let namespace: Arc<dyn Namespace> = Arc::new(LockedNamespace {
            puts: Arc::clone(&puts),
        });
        let ctx = CallContext::background();

        let err = PublisherBuilder::new("orders")
            .option(topic_publisher::with_namespace(namespace))
            .build(&ctx, &InMemoryConnector::new())
            .await
            .unwrap_err();

        match err {
            PublisherError::Provisioning { source, .. } => {
                assert_eq!(source.kind, TransportErrorKind::Rejected);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(puts.load(Ordering::SeqCst), 0);
    }
}
