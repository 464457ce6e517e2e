//! # Concurrent Publishing, Deadlines and Cancellation
//!
//! A single publisher is shared across tasks; every call carries its own
//! [`CallContext`](topic_publisher::CallContext).

#[cfg(test)]
mod tests {
    use super::super::fixtures::OrderPlaced;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use topic_publisher::{
        new_publisher, set_default_header, with_connection_string, CallContext, CancelReason,
        CancellationToken, InMemoryConnector, PublishOption, Publisher, PublisherError, Stage,
        TopicPublisherApi,
    };

    const CONN: &str = "Endpoint=sb://load.servicebus.windows.net/;SharedAccessKey=bG9hZA==";
    const NAMESPACE: &str = "load.servicebus.windows.net";

    async fn publisher(connector: &InMemoryConnector) -> Publisher {
        new_publisher(
            &CallContext::background(),
            connector,
            "orders",
            vec![
                with_connection_string(CONN),
                set_default_header("customer", "CustomerID"),
            ],
        )
        .await
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shared_publisher_across_tasks() {
        let connector = InMemoryConnector::new();
        let publisher = Arc::new(publisher(&connector).await);

        let tasks: Vec<_> = (0..64u64)
            .map(|n| {
                let publisher = Arc::clone(&publisher);
                tokio::spawn(async move {
                    let order = OrderPlaced::new(&format!("C-{}", n % 8), n);
                    publisher
                        .publish(
                            &CallContext::background(),
                            &order,
                            &[PublishOption::message_id(format!("order-{n}"))],
                        )
                        .await
                })
            })
            .collect();

        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        let sent = connector.namespace(NAMESPACE).unwrap().sent("orders");
        assert_eq!(sent.len(), 64);

        let ids: HashSet<_> = sent.iter().filter_map(|m| m.message_id.clone()).collect();
        assert_eq!(ids.len(), 64);
        assert!(sent.iter().all(|m| m.property("customer").is_some()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_publish_through_generic_api_bound() {
        let connector = InMemoryConnector::new();
        let publisher = Arc::new(publisher(&connector).await);

        // Callers that only need the inbound port.
        async fn send_batch<A: TopicPublisherApi>(api: &A, count: u64) -> usize {
            let ctx = CallContext::background();
            let mut ok = 0;
            for n in 0..count {
                if api.publish(&ctx, &OrderPlaced::new("C-1", n), &[]).await.is_ok() {
                    ok += 1;
                }
            }
            ok
        }

        let a = tokio::spawn({
            let publisher = Arc::clone(&publisher);
            async move { send_batch(publisher.as_ref(), 10).await }
        });
        let b = tokio::spawn({
            let publisher = Arc::clone(&publisher);
            async move { send_batch(publisher.as_ref(), 10).await }
        });

        assert_eq!(a.await.unwrap() + b.await.unwrap(), 20);
        assert_eq!(publisher.topic_name(), "orders");
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_cuts_slow_send() {
        let connector = InMemoryConnector::new();
        let publisher = publisher(&connector).await;
        let ns = connector.namespace(NAMESPACE).unwrap();
        ns.set_send_latency(Duration::from_secs(10));

        let ctx = CallContext::with_timeout(Duration::from_secs(2));
        let err = publisher
            .publish(&ctx, &OrderPlaced::new("C-1", 1), &[])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PublisherError::Cancelled {
                stage: Stage::Send,
                reason: CancelReason::DeadlineExceeded
            }
        ));
        assert!(err.is_transient());
        assert_eq!(ns.send_calls("orders"), 1);
        assert!(ns.sent("orders").is_empty());

        // A fresh context with enough budget succeeds.
        let ctx = CallContext::with_timeout(Duration::from_secs(30));
        publisher
            .publish(&ctx, &OrderPlaced::new("C-1", 2), &[])
            .await
            .unwrap();
        assert_eq!(ns.sent("orders").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_send() {
        let connector = InMemoryConnector::new();
        let publisher = Arc::new(publisher(&connector).await);
        let ns = connector.namespace(NAMESPACE).unwrap();
        ns.set_send_latency(Duration::from_secs(60));

        let token = CancellationToken::new();
        let ctx = CallContext::background().cancellable(token.clone());

        let task = tokio::spawn({
            let publisher = Arc::clone(&publisher);
            async move {
                publisher
                    .publish(&ctx, &OrderPlaced::new("C-1", 1), &[])
                    .await
            }
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();

        let err = task.await.unwrap().unwrap_err();
        assert!(err.is_cancelled());
        assert!(!err.is_transient());
        assert!(ns.sent("orders").is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_context_stops_build() {
        let connector = InMemoryConnector::new();
        let token = CancellationToken::new();
        token.cancel();
        let ctx = CallContext::background().cancellable(token);

        let err = new_publisher(&ctx, &connector, "orders", vec![with_connection_string(CONN)])
            .await
            .unwrap_err();

        assert_eq!(err.stage(), Stage::ResolveNamespace);
        assert!(err.is_cancelled());
        assert_eq!(connector.connect_calls(), 0);
    }
}
