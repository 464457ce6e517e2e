//! # Outgoing Message
//!
//! The message handed to the transport: encoded body plus user properties
//! and broker-level delivery metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// User property carrying the payload's logical type name.
pub const TYPE_PROPERTY: &str = "type";

/// A user property value attached to a message.
///
/// Subscribers filter on these, so scalar types are kept as-is rather than
/// stringified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
}

impl PropertyValue {
    /// Convert a JSON value, treating `null` as absent.
    ///
    /// Arrays and objects are carried as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_u64().map(Self::UInt))
                .or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) => Some(Self::String(s.clone())),
            other => Some(Self::String(other.to_string())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for PropertyValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u64> for PropertyValue {
    fn from(v: u64) -> Self {
        i64::try_from(v).map_or(Self::UInt(v), Self::Int)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// A message ready for transport hand-off.
#[derive(Clone, Debug, PartialEq)]
pub struct OutgoingMessage {
    /// Encoded payload.
    pub body: Vec<u8>,
    /// MIME type of `body`.
    pub content_type: String,
    /// Routing/filtering properties. Always contains [`TYPE_PROPERTY`]
    /// once decorated by a publisher.
    pub user_properties: BTreeMap<String, PropertyValue>,
    /// When set, the broker holds the message until this instant.
    pub scheduled_enqueue_time: Option<DateTime<Utc>>,
    /// Identifier used for duplicate detection.
    pub message_id: Option<String>,
    /// Correlation identifier for request/reply or tracing.
    pub correlation_id: Option<String>,
}

impl OutgoingMessage {
    /// Create a message with the given body and no properties.
    pub fn new(body: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            body,
            content_type: content_type.into(),
            user_properties: BTreeMap::new(),
            scheduled_enqueue_time: None,
            message_id: None,
            correlation_id: None,
        }
    }

    /// Set a user property, replacing any previous value.
    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        self.user_properties.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.user_properties.get(name)
    }

    /// The payload type tag, if the message has been decorated.
    #[must_use]
    pub fn type_tag(&self) -> Option<&str> {
        self.property(TYPE_PROPERTY).and_then(PropertyValue::as_str)
    }

    /// Get the body as a string (if valid UTF-8).
    #[must_use]
    pub fn body_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }

    /// Decode a JSON body.
    pub fn decode_json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}
