//! In-Memory Transport Adapter
//!
//! Implements the namespace, topic manager and topic sender ports without a
//! live service. Suitable for tests and local runs; failures can be injected
//! per operation and every call is recorded.

use crate::context::CallContext;
use crate::domain::{CredentialStrategy, OutgoingMessage, TopicEntity, TopicSetting, TransportError};
use crate::ports::{Namespace, NamespaceConnector, TopicManager, TopicSender};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use bus_telemetry::log_event;

#[derive(Debug)]
struct TopicState {
    entity: TopicEntity,
    sent: Vec<OutgoingMessage>,
    send_calls: usize,
}

/// Sticky injected failures; each stays until cleared.
#[derive(Debug, Default)]
struct Failures {
    get: Option<TransportError>,
    put: Option<TransportError>,
    bind: Option<TransportError>,
    send: Option<TransportError>,
}

#[derive(Debug)]
struct NamespaceState {
    name: String,
    topics: RwLock<HashMap<String, TopicState>>,
    get_calls: AtomicUsize,
    put_calls: AtomicUsize,
    failures: Mutex<Failures>,
    send_latency: RwLock<Option<Duration>>,
}

/// In-memory namespace. Clones share state.
#[derive(Clone, Debug)]
pub struct InMemoryNamespace {
    state: Arc<NamespaceState>,
}

impl InMemoryNamespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: Arc::new(NamespaceState {
                name: name.into(),
                topics: RwLock::new(HashMap::new()),
                get_calls: AtomicUsize::new(0),
                put_calls: AtomicUsize::new(0),
                failures: Mutex::new(Failures::default()),
                send_latency: RwLock::new(None),
            }),
        }
    }

    /// Seed a topic as if it had been created out of band.
    pub fn create_topic(&self, name: &str, settings: Vec<TopicSetting>) -> TopicEntity {
        let entity = TopicEntity::new(name, settings);
        self.state.topics.write().insert(
            name.to_string(),
            TopicState {
                entity: entity.clone(),
                sent: Vec::new(),
                send_calls: 0,
            },
        );
        entity
    }

    #[must_use]
    pub fn topic_entity(&self, name: &str) -> Option<TopicEntity> {
        self.state.topics.read().get(name).map(|t| t.entity.clone())
    }

    /// Messages successfully delivered to `topic`.
    #[must_use]
    pub fn sent(&self, topic: &str) -> Vec<OutgoingMessage> {
        self.state
            .topics
            .read()
            .get(topic)
            .map(|t| t.sent.clone())
            .unwrap_or_default()
    }

    /// Send attempts on `topic`, including failed ones.
    #[must_use]
    pub fn send_calls(&self, topic: &str) -> usize {
        self.state
            .topics
            .read()
            .get(topic)
            .map_or(0, |t| t.send_calls)
    }

    #[must_use]
    pub fn get_calls(&self) -> usize {
        self.state.get_calls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn put_calls(&self) -> usize {
        self.state.put_calls.load(Ordering::SeqCst)
    }

    pub fn fail_get(&self, error: TransportError) {
        self.state.failures.lock().get = Some(error);
    }

    pub fn fail_put(&self, error: TransportError) {
        self.state.failures.lock().put = Some(error);
    }

    pub fn fail_bind(&self, error: TransportError) {
        self.state.failures.lock().bind = Some(error);
    }

    pub fn fail_send(&self, error: TransportError) {
        self.state.failures.lock().send = Some(error);
    }

    pub fn clear_failures(&self) {
        *self.state.failures.lock() = Failures::default();
    }

    /// Make every send wait `latency` before completing.
    pub fn set_send_latency(&self, latency: Duration) {
        *self.state.send_latency.write() = Some(latency);
    }
}

impl Namespace for InMemoryNamespace {
    fn name(&self) -> &str {
        &self.state.name
    }

    fn topic_manager(&self) -> Arc<dyn TopicManager> {
        Arc::new(InMemoryTopicManager {
            state: Arc::clone(&self.state),
        })
    }

    fn topic(&self, name: &str) -> Result<Arc<dyn TopicSender>, TransportError> {
        if let Some(e) = self.state.failures.lock().bind.clone() {
            return Err(e);
        }
        Ok(Arc::new(InMemoryTopic {
            state: Arc::clone(&self.state),
            name: name.to_string(),
        }))
    }
}

/// Topic manager over an [`InMemoryNamespace`].
pub struct InMemoryTopicManager {
    state: Arc<NamespaceState>,
}

#[async_trait]
impl TopicManager for InMemoryTopicManager {
    async fn get(&self, _ctx: &CallContext, name: &str) -> Result<TopicEntity, TransportError> {
        self.state.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.state.failures.lock().get.clone() {
            return Err(e);
        }
        self.state
            .topics
            .read()
            .get(name)
            .map(|t| t.entity.clone())
            .ok_or_else(|| TransportError::not_found(format!("topic {name} does not exist")))
    }

    async fn put(
        &self,
        _ctx: &CallContext,
        name: &str,
        settings: &[TopicSetting],
    ) -> Result<TopicEntity, TransportError> {
        self.state.put_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.state.failures.lock().put.clone() {
            return Err(e);
        }

        let mut topics = self.state.topics.write();
        let topic = topics.entry(name.to_string()).or_insert_with(|| TopicState {
            entity: TopicEntity::new(name, Vec::new()),
            sent: Vec::new(),
            send_calls: 0,
        });
        // PUT is create-or-update on the service.
        topic.entity.settings = settings.to_vec();

        log_event!(
            debug,
            "in-memory",
            "In-memory topic stored",
            namespace = %self.state.name,
            topic = name
        );
        Ok(topic.entity.clone())
    }
}

/// Sending handle for one in-memory topic.
pub struct InMemoryTopic {
    state: Arc<NamespaceState>,
    name: String,
}

#[async_trait]
impl TopicSender for InMemoryTopic {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, _ctx: &CallContext, message: OutgoingMessage) -> Result<(), TransportError> {
        {
            let mut topics = self.state.topics.write();
            let topic = topics
                .get_mut(&self.name)
                .ok_or_else(|| TransportError::not_found(format!("topic {} does not exist", self.name)))?;
            topic.send_calls += 1;
        }

        let latency = *self.state.send_latency.read();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(e) = self.state.failures.lock().send.clone() {
            return Err(e);
        }

        let mut topics = self.state.topics.write();
        let topic = topics
            .get_mut(&self.name)
            .ok_or_else(|| TransportError::not_found(format!("topic {} does not exist", self.name)))?;
        topic.sent.push(message);
        Ok(())
    }
}

/// Connector that hands out [`InMemoryNamespace`]s, one per namespace name.
#[derive(Debug, Default)]
pub struct InMemoryConnector {
    namespaces: Mutex<HashMap<String, InMemoryNamespace>>,
    strategies: Mutex<Vec<CredentialStrategy>>,
    failure: Mutex<Option<TransportError>>,
}

impl InMemoryConnector {
    /// Namespace name used for ambient credentials.
    pub const AMBIENT_NAMESPACE: &'static str = "ambient.servicebus.local";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every subsequent `connect`.
    pub fn fail_connect(&self, error: TransportError) {
        *self.failure.lock() = Some(error);
    }

    #[must_use]
    pub fn connect_calls(&self) -> usize {
        self.strategies.lock().len()
    }

    /// Strategies passed to `connect`, in call order.
    #[must_use]
    pub fn strategies(&self) -> Vec<CredentialStrategy> {
        self.strategies.lock().clone()
    }

    /// Names of namespaces handed out so far.
    #[must_use]
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = self.namespaces.lock().keys().cloned().collect();
        names.sort();
        names
    }

    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<InMemoryNamespace> {
        self.namespaces.lock().get(name).cloned()
    }
}

#[async_trait]
impl NamespaceConnector for InMemoryConnector {
    async fn connect(
        &self,
        _ctx: &CallContext,
        strategy: &CredentialStrategy,
    ) -> Result<Arc<dyn Namespace>, TransportError> {
        self.strategies.lock().push(strategy.clone());
        if let Some(e) = self.failure.lock().clone() {
            return Err(e);
        }

        let name = match strategy {
            CredentialStrategy::Default => Self::AMBIENT_NAMESPACE,
            other => other.namespace_name().ok_or_else(|| {
                TransportError::unauthorized("connection string has no endpoint")
            })?,
        };

        let namespace = self
            .namespaces
            .lock()
            .entry(name.to_string())
            .or_insert_with(|| InMemoryNamespace::new(name))
            .clone();
        Ok(Arc::new(namespace))
    }
}
