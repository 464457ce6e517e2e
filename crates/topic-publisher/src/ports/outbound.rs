//! # Outbound Ports
//!
//! Traits for the external collaborators: the message-bus transport, the
//! payload encoder and the clock.

use crate::context::CallContext;
use crate::domain::{CredentialStrategy, OutgoingMessage, TopicEntity, TopicSetting, TransportError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Resolves credentials into a live namespace - outbound port.
#[async_trait]
pub trait NamespaceConnector: Send + Sync {
    /// Authenticate and return a namespace handle.
    async fn connect(
        &self,
        ctx: &CallContext,
        strategy: &CredentialStrategy,
    ) -> Result<Arc<dyn Namespace>, TransportError>;
}

/// An authenticated namespace.
pub trait Namespace: Send + Sync {
    /// Fully qualified namespace name.
    fn name(&self) -> &str;

    /// Management client for topic entities.
    fn topic_manager(&self) -> Arc<dyn TopicManager>;

    /// Sending handle for an existing topic.
    fn topic(&self, name: &str) -> Result<Arc<dyn TopicSender>, TransportError>;
}

/// Topic management - outbound port.
#[async_trait]
pub trait TopicManager: Send + Sync {
    /// Fetch an existing topic. Must report absence as `NotFound`.
    async fn get(&self, ctx: &CallContext, name: &str) -> Result<TopicEntity, TransportError>;

    /// Create a topic with the given settings.
    async fn put(
        &self,
        ctx: &CallContext,
        name: &str,
        settings: &[TopicSetting],
    ) -> Result<TopicEntity, TransportError>;
}

/// Message sending - outbound port.
#[async_trait]
pub trait TopicSender: Send + Sync {
    /// Topic this handle sends to.
    fn name(&self) -> &str;

    /// Deliver one message.
    async fn send(&self, ctx: &CallContext, message: OutgoingMessage) -> Result<(), TransportError>;
}

/// Payload serializer.
pub trait PayloadEncoder: Send + Sync {
    /// MIME type of the produced bytes.
    fn content_type(&self) -> &str;

    /// Serialize `payload` to bytes.
    fn encode<T: Serialize + ?Sized>(
        &self,
        payload: &T,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Time source for scheduled delivery.
///
/// Abstracted to allow testing with deterministic time.
pub trait TimeSource: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Default system time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
