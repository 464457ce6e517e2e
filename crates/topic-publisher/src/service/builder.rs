//! # Publisher Builder
//!
//! Applies management options in order, resolves the namespace, provisions
//! the topic and binds a sending handle.
//!
//! | Option kind | Merge rule |
//! |-------------|------------|
//! | Credential / namespace | Last write wins (warned, or rejected with `exclusive_credentials`) |
//! | Default header | Merged by header name |
//! | Topic setting | Appended, replayed once at provisioning |

use super::namespace::resolve_namespace;
use super::provisioner::ensure_topic;
use super::publisher::Publisher;
use crate::adapters::JsonEncoder;
use crate::context::CallContext;
use crate::domain::{CredentialStrategy, PublisherError, Result, TopicSetting, TYPE_PROPERTY};
use crate::ports::{Namespace, NamespaceConnector, PayloadEncoder, SystemTimeSource, TimeSource};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use bus_telemetry::log_event;
use tracing::{info_span, Instrument};

/// A build-time option.
#[derive(Clone)]
pub enum ManagementOption {
    /// Authenticate with this strategy.
    Credential(CredentialStrategy),
    /// Reuse an already-resolved namespace.
    Namespace(Arc<dyn Namespace>),
    /// Copy payload field `field` into header `header` on every message.
    DefaultHeader { header: String, field: String },
    /// Topic setting applied when the topic is created.
    TopicSetting(TopicSetting),
}

impl fmt::Debug for ManagementOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credential(s) => f.debug_tuple("Credential").field(s).finish(),
            Self::Namespace(ns) => f.debug_tuple("Namespace").field(&ns.name()).finish(),
            Self::DefaultHeader { header, field } => f
                .debug_struct("DefaultHeader")
                .field("header", header)
                .field("field", field)
                .finish(),
            Self::TopicSetting(s) => f.debug_tuple("TopicSetting").field(s).finish(),
        }
    }
}

/// Authenticate with a shared access connection string.
pub fn with_connection_string(connection_string: impl Into<String>) -> ManagementOption {
    ManagementOption::Credential(CredentialStrategy::ConnectionString(
        connection_string.into(),
    ))
}

/// Authenticate with the managed identity identified by `client_id`.
pub fn with_managed_identity_client_id(
    namespace: impl Into<String>,
    client_id: impl Into<String>,
) -> ManagementOption {
    ManagementOption::Credential(CredentialStrategy::ManagedIdentityClientId {
        namespace: namespace.into(),
        client_id: client_id.into(),
    })
}

/// Authenticate with the managed identity identified by `resource_id`.
pub fn with_managed_identity_resource_id(
    namespace: impl Into<String>,
    resource_id: impl Into<String>,
) -> ManagementOption {
    ManagementOption::Credential(CredentialStrategy::ManagedIdentityResourceId {
        namespace: namespace.into(),
        resource_id: resource_id.into(),
    })
}

/// Alias of [`with_managed_identity_client_id`].
#[deprecated(note = "use with_managed_identity_client_id or with_managed_identity_resource_id")]
pub fn with_managed_identity(
    namespace: impl Into<String>,
    client_id: impl Into<String>,
) -> ManagementOption {
    with_managed_identity_client_id(namespace, client_id)
}

/// Publish through an existing namespace handle.
pub fn with_namespace(namespace: Arc<dyn Namespace>) -> ManagementOption {
    ManagementOption::Namespace(namespace)
}

/// Add header `header` to every message, valued from payload field `field`.
pub fn set_default_header(header: impl Into<String>, field: impl Into<String>) -> ManagementOption {
    ManagementOption::DefaultHeader {
        header: header.into(),
        field: field.into(),
    }
}

/// Enable duplicate detection. `None` uses the 30 second default; the
/// maximum is 7 days.
pub fn set_duplicate_detection(window: Option<Duration>) -> ManagementOption {
    ManagementOption::TopicSetting(TopicSetting::duplicate_detection(window))
}

/// Default time-to-live for messages on the topic.
pub fn set_message_time_to_live(ttl: Duration) -> ManagementOption {
    ManagementOption::TopicSetting(TopicSetting::DefaultMessageTimeToLive(ttl))
}

/// Maximum topic size in megabytes.
pub fn set_max_size_megabytes(size: u32) -> ManagementOption {
    ManagementOption::TopicSetting(TopicSetting::MaxSizeInMegabytes(size))
}

#[derive(Default)]
enum NamespaceSource {
    #[default]
    Ambient,
    Credential(CredentialStrategy),
    Handle(Arc<dyn Namespace>),
}

impl NamespaceSource {
    fn describe(&self) -> &'static str {
        match self {
            Self::Ambient => "default",
            Self::Credential(s) => s.kind(),
            Self::Handle(_) => "namespace-handle",
        }
    }
}

/// Accumulated state while options are applied.
#[derive(Default)]
struct Draft {
    source: NamespaceSource,
    headers: HashMap<String, String>,
    settings: Vec<TopicSetting>,
}

impl Draft {
    fn apply(&mut self, option: ManagementOption, exclusive_credentials: bool) -> Result<()> {
        match option {
            ManagementOption::Credential(strategy) => {
                strategy.validate().map_err(PublisherError::Configuration)?;
                self.assign_source(NamespaceSource::Credential(strategy), exclusive_credentials)
            }
            ManagementOption::Namespace(ns) => {
                self.assign_source(NamespaceSource::Handle(ns), exclusive_credentials)
            }
            ManagementOption::DefaultHeader { header, field } => {
                if header.is_empty() || field.is_empty() {
                    return Err(PublisherError::Configuration(
                        "default header name and field key cannot be empty".into(),
                    ));
                }
                if header == TYPE_PROPERTY {
                    return Err(PublisherError::Configuration(format!(
                        "header `{TYPE_PROPERTY}` is reserved for the payload type"
                    )));
                }
                self.headers.insert(header, field);
                Ok(())
            }
            ManagementOption::TopicSetting(setting) => {
                setting.validate().map_err(PublisherError::Configuration)?;
                self.settings.push(setting);
                Ok(())
            }
        }
    }

    fn assign_source(&mut self, next: NamespaceSource, exclusive: bool) -> Result<()> {
        if !matches!(self.source, NamespaceSource::Ambient) {
            let (previous, replacement) = (self.source.describe(), next.describe());
            if exclusive {
                return Err(PublisherError::Configuration(format!(
                    "multiple credential strategies configured: {previous} then {replacement}"
                )));
            }
            log_event!(
                warn,
                "builder",
                "Credential strategy overwritten, last one wins",
                previous,
                replacement
            );
        }
        self.source = next;
        Ok(())
    }
}

/// Assembles a [`Publisher`].
pub struct PublisherBuilder<E = JsonEncoder> {
    topic: String,
    options: Vec<ManagementOption>,
    exclusive_credentials: bool,
    encoder: E,
    clock: Arc<dyn TimeSource>,
}

impl PublisherBuilder<JsonEncoder> {
    /// Builder for topic `topic` with JSON payloads.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            options: Vec::new(),
            exclusive_credentials: false,
            encoder: JsonEncoder,
            clock: Arc::new(SystemTimeSource),
        }
    }
}

impl<E: PayloadEncoder> PublisherBuilder<E> {
    /// Append one option.
    #[must_use]
    pub fn option(mut self, option: ManagementOption) -> Self {
        self.options.push(option);
        self
    }

    /// Append options, preserving order.
    #[must_use]
    pub fn options(mut self, options: impl IntoIterator<Item = ManagementOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Reject a second credential strategy instead of letting it win.
    #[must_use]
    pub fn exclusive_credentials(mut self, exclusive: bool) -> Self {
        self.exclusive_credentials = exclusive;
        self
    }

    /// Clock used for delayed delivery.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn TimeSource>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the payload encoder.
    pub fn encoder<E2: PayloadEncoder>(self, encoder: E2) -> PublisherBuilder<E2> {
        PublisherBuilder {
            topic: self.topic,
            options: self.options,
            exclusive_credentials: self.exclusive_credentials,
            encoder,
            clock: self.clock,
        }
    }

    /// Apply options, resolve the namespace, provision and bind the topic.
    ///
    /// No publisher is returned unless every step succeeds.
    pub async fn build(
        self,
        ctx: &CallContext,
        connector: &dyn NamespaceConnector,
    ) -> Result<Publisher<E>> {
        let span = info_span!("build_publisher", topic = %self.topic);
        self.build_inner(ctx, connector).instrument(span).await
    }

    async fn build_inner(
        self,
        ctx: &CallContext,
        connector: &dyn NamespaceConnector,
    ) -> Result<Publisher<E>> {
        if self.topic.trim().is_empty() {
            return Err(PublisherError::Configuration(
                "topic name cannot be empty".into(),
            ));
        }

        let mut draft = Draft::default();
        for option in self.options {
            log_event!(debug, "builder", "Applying management option", option = ?option);
            draft.apply(option, self.exclusive_credentials)?;
        }

        let namespace = match draft.source {
            NamespaceSource::Handle(ns) => ns,
            NamespaceSource::Credential(strategy) => {
                resolve_namespace(ctx, connector, &strategy).await?
            }
            NamespaceSource::Ambient => {
                resolve_namespace(ctx, connector, &CredentialStrategy::Default).await?
            }
        };

        let entity = ensure_topic(ctx, &self.topic, namespace.as_ref(), &draft.settings).await?;

        let topic = namespace
            .topic(&entity.name)
            .map_err(|source| PublisherError::Binding {
                topic: entity.name.clone(),
                source,
            })?;

        log_event!(
            info,
            "builder",
            "Publisher ready",
            namespace = namespace.name(),
            topic_id = %entity.id,
            headers = draft.headers.len()
        );

        Ok(Publisher::from_parts(
            namespace,
            topic,
            entity,
            draft.headers,
            draft.settings,
            self.encoder,
            self.clock,
        ))
    }
}

impl<E> fmt::Debug for PublisherBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublisherBuilder")
            .field("topic", &self.topic)
            .field("options", &self.options)
            .field("exclusive_credentials", &self.exclusive_credentials)
            .finish_non_exhaustive()
    }
}

/// Build a JSON publisher for `topic` from `options`.
pub async fn new_publisher(
    ctx: &CallContext,
    connector: &dyn NamespaceConnector,
    topic: impl Into<String>,
    options: impl IntoIterator<Item = ManagementOption>,
) -> Result<Publisher> {
    PublisherBuilder::new(topic)
        .options(options)
        .build(ctx, connector)
        .await
}
