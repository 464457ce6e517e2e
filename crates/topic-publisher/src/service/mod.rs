//! # Service Layer
//!
//! Namespace resolution, topic provisioning, the publisher builder and the
//! per-message send path.

pub mod builder;
pub mod namespace;
pub mod options;
pub mod provisioner;
pub mod publisher;

#[allow(deprecated)]
pub use builder::with_managed_identity;
pub use builder::{
    new_publisher, set_default_header, set_duplicate_detection, set_max_size_megabytes,
    set_message_time_to_live, with_connection_string, with_managed_identity_client_id,
    with_managed_identity_resource_id, with_namespace, ManagementOption, PublisherBuilder,
};
pub use namespace::resolve_namespace;
pub use options::{CustomOptionFn, PublishOption};
pub use provisioner::ensure_topic;
pub use publisher::Publisher;
