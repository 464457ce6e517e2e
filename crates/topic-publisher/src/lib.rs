//! # Topic Publisher
//!
//! Publishes typed payloads to a named topic on a message-bus namespace.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Resolve a namespace from a credential strategy (connection string,
//!   managed identity, ambient default)
//! - Provision the topic once, at build time, if it does not exist
//! - Serialize each payload, tag it with its type name, copy configured
//!   payload fields into headers, apply per-message options, send
//!
//! ## Call Flow
//!
//! ```text
//! PublisherBuilder::build
//!   ├── apply ManagementOptions (in order)
//!   ├── resolve_namespace   (NamespaceConnector)
//!   ├── ensure_topic        (TopicManager: get, put on NotFound)
//!   └── bind                (Namespace::topic)
//!
//! Publisher::publish
//!   ├── encode              (PayloadEncoder)
//!   ├── "type" header       (Payload::type_name)
//!   ├── default headers     (Payload::field)
//!   ├── PublishOptions      (in order)
//!   └── send                (TopicSender)
//! ```
//!
//! Every remote call runs under a [`CallContext`] carrying an optional
//! deadline and cancellation token.
//!
//! ## Module Structure
//!
//! ```text
//! topic-publisher/
//! ├── domain/      # Messages, topics, credentials, Payload, errors
//! ├── ports/       # TopicPublisherApi, NamespaceConnector, TopicManager, TopicSender
//! ├── service/     # Builder, provisioner, publisher, publish options
//! ├── adapters/    # JSON encoder, in-memory namespace, manual clock
//! ├── context.rs   # Deadlines and cancellation
//! └── config.rs    # PublisherConfig
//! ```

#![warn(clippy::all)]

pub mod adapters;
pub mod config;
pub mod context;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    InMemoryConnector, InMemoryNamespace, InMemoryTopic, InMemoryTopicManager, JsonEncoder,
    ManualTimeSource,
};
pub use config::{ConfigError, PublisherConfig};
pub use context::{CallContext, CancellationToken};
pub use domain::{
    short_type_name, CancelReason, CredentialStrategy, EncodeError, OptionError, OutgoingMessage,
    Payload, PropertyValue, PublisherError, Result, Stage, TopicCall, TopicEntity, TopicSetting,
    TransportError, TransportErrorKind, ALLOWED_MAX_SIZES_MB, DEFAULT_DUPLICATE_DETECTION_WINDOW,
    MAX_DUPLICATE_DETECTION_WINDOW, TYPE_PROPERTY,
};
pub use ports::{
    Namespace, NamespaceConnector, PayloadEncoder, SystemTimeSource, TimeSource, TopicManager,
    TopicPublisherApi, TopicSender,
};
#[allow(deprecated)]
pub use service::with_managed_identity;
pub use service::{
    ensure_topic, new_publisher, resolve_namespace, set_default_header, set_duplicate_detection,
    set_max_size_megabytes, set_message_time_to_live, with_connection_string,
    with_managed_identity_client_id, with_managed_identity_resource_id, with_namespace,
    CustomOptionFn, ManagementOption, PublishOption, Publisher, PublisherBuilder,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
