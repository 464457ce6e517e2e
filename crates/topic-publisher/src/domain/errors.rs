//! # Domain Errors
//!
//! Error types for the topic publisher.
//!
//! Build-time failures (`Configuration`, `Authentication`, `Provisioning`,
//! `Binding`) abort publisher construction. Send-time failures (`Encoding`,
//! `Option`, `Delivery`) abort a single publish call. `Cancelled` can occur
//! at any stage that waits on the transport.

use std::fmt;
use thiserror::Error;

/// Classification of a transport failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The entity definitely does not exist.
    NotFound,
    /// Credentials were rejected.
    Unauthorized,
    /// The service could not be reached or is throttling.
    Unavailable,
    /// The service refused the request.
    Rejected,
    /// Anything else.
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotFound => "not found",
            Self::Unauthorized => "unauthorized",
            Self::Unavailable => "unavailable",
            Self::Rejected => "rejected",
            Self::Other => "transport error",
        };
        f.write_str(s)
    }
}

/// Error reported by a transport port.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct TransportError {
    /// Failure classification.
    pub kind: TransportErrorKind,
    /// Human-readable detail from the transport.
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::NotFound, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unauthorized, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Unavailable, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Rejected, message)
    }

    /// True only for a definitive not-found answer.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == TransportErrorKind::NotFound
    }
}

/// Failure raised while applying a publish option to a message.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("publish option `{option}` failed: {reason}")]
pub struct OptionError {
    /// Name of the option that failed.
    pub option: String,
    /// Why it failed.
    pub reason: String,
}

impl OptionError {
    pub fn new(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            option: option.into(),
            reason: reason.into(),
        }
    }
}

/// Payload serialization failure.
#[derive(Debug, Error)]
#[error("failed to encode payload of type {type_name}: {source}")]
pub struct EncodeError {
    /// Logical type name of the payload.
    pub type_name: String,
    /// Underlying serializer error.
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

/// Pipeline stage at which an error surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Configure,
    ResolveNamespace,
    Provision,
    Bind,
    Encode,
    ApplyOptions,
    Send,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Configure => "configure",
            Self::ResolveNamespace => "resolve namespace",
            Self::Provision => "provision topic",
            Self::Bind => "bind topic",
            Self::Encode => "encode payload",
            Self::ApplyOptions => "apply publish options",
            Self::Send => "send",
        };
        f.write_str(s)
    }
}

/// Topic management call that failed during provisioning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TopicCall {
    /// Lookup of an existing topic.
    Get,
    /// Creation after a not-found lookup.
    Put,
}

impl fmt::Display for TopicCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("get"),
            Self::Put => f.write_str("create"),
        }
    }
}

/// Why an operation was abandoned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CancelReason {
    /// The caller's cancellation token fired.
    Cancelled,
    /// The caller's deadline passed.
    DeadlineExceeded,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("cancelled"),
            Self::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

/// Publisher error type.
#[derive(Debug, Error)]
pub enum PublisherError {
    /// Missing or invalid configuration, detected before any network call.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Credential resolution failed.
    #[error("Failed to resolve namespace using {strategy} credentials: {source}")]
    Authentication {
        /// Credential strategy that was attempted.
        strategy: &'static str,
        #[source]
        source: TransportError,
    },

    /// Topic get/put failed.
    #[error("Failed to {call} topic {topic}: {source}")]
    Provisioning {
        topic: String,
        call: TopicCall,
        #[source]
        source: TransportError,
    },

    /// Topic handle creation failed.
    #[error("Failed to create new topic {topic}: {source}")]
    Binding {
        topic: String,
        #[source]
        source: TransportError,
    },

    /// Payload could not be serialized.
    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodeError),

    /// A publish option rejected the message.
    #[error(transparent)]
    Option(#[from] OptionError),

    /// The transport failed to deliver the message.
    #[error("Failed to send message to topic {topic}: {source}")]
    Delivery {
        topic: String,
        #[source]
        source: TransportError,
    },

    /// The caller cancelled or the deadline passed mid-operation.
    #[error("{stage} {reason}")]
    Cancelled { stage: Stage, reason: CancelReason },
}

impl PublisherError {
    /// Stage at which this error surfaced.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Configuration(_) => Stage::Configure,
            Self::Authentication { .. } => Stage::ResolveNamespace,
            Self::Provisioning { .. } => Stage::Provision,
            Self::Binding { .. } => Stage::Bind,
            Self::Encoding(_) => Stage::Encode,
            Self::Option(_) => Stage::ApplyOptions,
            Self::Delivery { .. } => Stage::Send,
            Self::Cancelled { stage, .. } => *stage,
        }
    }

    /// Whether the same call could succeed if retried later.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Authentication { source, .. }
            | Self::Provisioning { source, .. }
            | Self::Binding { source, .. }
            | Self::Delivery { source, .. } => source.kind == TransportErrorKind::Unavailable,
            Self::Cancelled { reason, .. } => *reason == CancelReason::DeadlineExceeded,
            Self::Configuration(_) | Self::Encoding(_) | Self::Option(_) => false,
        }
    }

    /// Whether this error came from the caller's cancellation or deadline.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, PublisherError>;
