//! # Publisher
//!
//! Per-message decoration and send path.
//!
//! ```text
//! payload ──encode──→ body ──tag "type"──→ extract headers ──options──→ send
//!            │                                                 │          │
//!         Encoding                                           Option    Delivery
//! ```
//!
//! Every step before `send` is synchronous and deterministic for a given
//! payload and option list. Nothing is retried.

use super::options::PublishOption;
use crate::adapters::JsonEncoder;
use crate::context::CallContext;
use crate::domain::{
    EncodeError, OutgoingMessage, Payload, PublisherError, Result, Stage, TopicEntity,
    TopicSetting, TYPE_PROPERTY,
};
use crate::ports::{Namespace, PayloadEncoder, TimeSource, TopicPublisherApi, TopicSender};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use bus_telemetry::log_event;

/// A publisher bound to one topic.
///
/// Immutable after build; share it across tasks by reference or `Arc`.
pub struct Publisher<E = JsonEncoder> {
    namespace: Arc<dyn Namespace>,
    topic: Arc<dyn TopicSender>,
    entity: TopicEntity,
    /// header name → payload field key
    headers: HashMap<String, String>,
    settings: Vec<TopicSetting>,
    encoder: E,
    clock: Arc<dyn TimeSource>,
}

impl Publisher<JsonEncoder> {
    /// Start building a JSON publisher for `topic`.
    pub fn builder(topic: impl Into<String>) -> super::PublisherBuilder {
        super::PublisherBuilder::new(topic)
    }
}

impl<E: PayloadEncoder> Publisher<E> {
    pub(crate) fn from_parts(
        namespace: Arc<dyn Namespace>,
        topic: Arc<dyn TopicSender>,
        entity: TopicEntity,
        headers: HashMap<String, String>,
        settings: Vec<TopicSetting>,
        encoder: E,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            namespace,
            topic,
            entity,
            headers,
            settings,
            encoder,
            clock,
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &Arc<dyn Namespace> {
        &self.namespace
    }

    #[must_use]
    pub fn topic_name(&self) -> &str {
        self.topic.name()
    }

    /// The topic entity returned by provisioning.
    #[must_use]
    pub fn entity(&self) -> &TopicEntity {
        &self.entity
    }

    /// Header extraction table.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Settings used when provisioning (only applied if the topic was created).
    #[must_use]
    pub fn settings(&self) -> &[TopicSetting] {
        &self.settings
    }

    /// Build the message `publish` would send, without sending it.
    pub fn decorate<P>(&self, payload: &P, options: &[PublishOption]) -> Result<OutgoingMessage>
    where
        P: Payload + ?Sized,
    {
        let type_name = payload.type_name().into_owned();

        let body = self
            .encoder
            .encode(payload)
            .map_err(|source| EncodeError {
                type_name: type_name.clone(),
                source,
            })?;

        let mut message = OutgoingMessage::new(body, self.encoder.content_type());
        message.set_property(TYPE_PROPERTY, type_name);

        for (header, field) in &self.headers {
            if let Some(value) = payload.field(field) {
                message.set_property(header.clone(), value);
            }
        }

        for option in options {
            option.apply(&mut message, self.clock.as_ref())?;
        }

        Ok(message)
    }

    /// Encode, decorate and send `payload`.
    ///
    /// Any failure aborts this call only; the message is neither delivered
    /// nor queued for retry.
    pub async fn publish<P>(
        &self,
        ctx: &CallContext,
        payload: &P,
        options: &[PublishOption],
    ) -> Result<()>
    where
        P: Payload + Sync + ?Sized,
    {
        let topic = self.topic.name();
        let message = self
            .decorate(payload, options)
            .inspect_err(|e| {
                log_event!(
                    debug,
                    "publisher",
                    "Message rejected",
                    topic,
                    stage = %e.stage(),
                    error = %e
                )
            })?;

        log_event!(
            debug,
            "publisher",
            "Sending message",
            topic,
            message_type = message.type_tag(),
            properties = message.user_properties.len(),
            scheduled = message.scheduled_enqueue_time.is_some()
        );

        ctx.run(Stage::Send, async {
            self.topic
                .send(ctx, message)
                .await
                .map_err(|source| PublisherError::Delivery {
                    topic: topic.to_string(),
                    source,
                })
        })
        .await
        .inspect_err(|e| log_event!(warn, "publisher", "Publish failed", topic, error = %e))
    }
}

#[async_trait]
impl<E: PayloadEncoder> TopicPublisherApi for Publisher<E> {
    fn topic_name(&self) -> &str {
        self.topic.name()
    }

    async fn publish<P>(&self, ctx: &CallContext, payload: &P, options: &[PublishOption]) -> Result<()>
    where
        P: Payload + Sync,
    {
        Publisher::publish(self, ctx, payload, options).await
    }
}

impl<E> fmt::Debug for Publisher<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("namespace", &self.namespace.name())
            .field("topic", &self.topic.name())
            .field("topic_id", &self.entity.id)
            .field("headers", &self.headers)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
