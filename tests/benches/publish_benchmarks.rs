//! # Publish Path Benchmarks
//!
//! | Path | Measures |
//! |------|----------|
//! | decorate | encode + type tag + header extraction + options |
//! | publish | decorate + send to a discarding transport |

use async_trait::async_trait;
use bus_tests::integration::fixtures::OrderPlaced;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;
use topic_publisher::{
    new_publisher, set_default_header, with_namespace, CallContext, InMemoryConnector, Namespace,
    OutgoingMessage, PublishOption, Publisher, TopicEntity, TopicManager, TopicSender,
    TopicSetting, TransportError,
};

/// Namespace that accepts and drops everything.
struct DiscardNamespace;

#[async_trait]
impl TopicManager for DiscardNamespace {
    async fn get(&self, _ctx: &CallContext, name: &str) -> Result<TopicEntity, TransportError> {
        Ok(TopicEntity::new(name, Vec::new()))
    }

    async fn put(
        &self,
        _ctx: &CallContext,
        name: &str,
        settings: &[TopicSetting],
    ) -> Result<TopicEntity, TransportError> {
        Ok(TopicEntity::new(name, settings.to_vec()))
    }
}

#[async_trait]
impl TopicSender for DiscardNamespace {
    fn name(&self) -> &str {
        "discard"
    }

    async fn send(&self, _ctx: &CallContext, message: OutgoingMessage) -> Result<(), TransportError> {
        black_box(message);
        Ok(())
    }
}

impl Namespace for DiscardNamespace {
    fn name(&self) -> &str {
        "discard"
    }

    fn topic_manager(&self) -> Arc<dyn TopicManager> {
        Arc::new(DiscardNamespace)
    }

    fn topic(&self, _name: &str) -> Result<Arc<dyn TopicSender>, TransportError> {
        Ok(Arc::new(DiscardNamespace))
    }
}

fn build_publisher(rt: &Runtime, connector: &InMemoryConnector, headers: usize) -> Publisher {
    let options = ["CustomerID", "OrderNumber", "Region", "TotalCents"]
        .iter()
        .take(headers)
        .map(|field| set_default_header(field.to_lowercase(), *field))
        .collect::<Vec<_>>();

    rt.block_on(new_publisher(
        &CallContext::background(),
        connector,
        "bench",
        options,
    ))
    .unwrap()
}

fn bench_decorate(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let connector = InMemoryConnector::new();
    let order = OrderPlaced::new("C-42", 1001).in_region("eu-west");
    let options = [
        PublishOption::delay(Duration::from_secs(5)),
        PublishOption::message_id("order-1001"),
    ];

    let mut group = c.benchmark_group("decorate");
    for headers in [0, 2, 4] {
        let publisher = build_publisher(&rt, &connector, headers);
        group.bench_with_input(BenchmarkId::new("headers", headers), &headers, |b, _| {
            b.iter(|| black_box(publisher.decorate(&order, &options).unwrap()))
        });
    }
    group.finish();
}

fn bench_publish(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let publisher = rt
        .block_on(new_publisher(
            &CallContext::background(),
            &InMemoryConnector::new(),
            "bench",
            vec![
                with_namespace(Arc::new(DiscardNamespace)),
                set_default_header("customer", "CustomerID"),
            ],
        ))
        .unwrap();
    let ctx = CallContext::background();
    let order = OrderPlaced::new("C-42", 1001);

    let mut group = c.benchmark_group("publish");
    group.throughput(Throughput::Elements(1));
    group.bench_function("discard", |b| {
        b.to_async(&rt)
            .iter(|| async { publisher.publish(&ctx, &order, &[]).await.unwrap() })
    });
    group.finish();
}

criterion_group!(benches, bench_decorate, bench_publish);
criterion_main!(benches);
