//! # Domain Layer
//!
//! Pure types: messages, topics, credentials, payload capability, errors.

pub mod credentials;
pub mod errors;
pub mod message;
pub mod payload;
pub mod topic;

pub use credentials::CredentialStrategy;
pub use errors::{
    CancelReason, EncodeError, OptionError, PublisherError, Result, Stage, TopicCall,
    TransportError, TransportErrorKind,
};
pub use message::{OutgoingMessage, PropertyValue, TYPE_PROPERTY};
pub use payload::{short_type_name, Payload};
pub use topic::{
    TopicEntity, TopicSetting, ALLOWED_MAX_SIZES_MB, DEFAULT_DUPLICATE_DETECTION_WINDOW,
    MAX_DUPLICATE_DETECTION_WINDOW,
};
