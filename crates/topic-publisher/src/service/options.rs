//! # Publish Options
//!
//! Per-message settings applied, in order, after decoration and before
//! sending. A failing option aborts the publish call; nothing is sent.

use crate::domain::{OptionError, OutgoingMessage, PropertyValue, TYPE_PROPERTY};
use crate::ports::TimeSource;
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Signature of a caller-supplied option.
pub type CustomOptionFn = dyn Fn(&mut OutgoingMessage) -> Result<(), OptionError> + Send + Sync;

/// A per-message option.
#[derive(Clone)]
pub enum PublishOption {
    /// Schedule delivery `Duration` from now.
    Delay(Duration),
    /// Schedule delivery at a fixed instant.
    ScheduleAt(DateTime<Utc>),
    /// Message ID, used by the service for duplicate detection.
    MessageId(String),
    /// Correlation ID.
    CorrelationId(String),
    /// Extra user property.
    Property { name: String, value: PropertyValue },
    /// Caller-supplied mutation.
    Custom {
        name: String,
        apply: Arc<CustomOptionFn>,
    },
}

impl PublishOption {
    pub fn delay(delay: Duration) -> Self {
        Self::Delay(delay)
    }

    pub fn schedule_at(at: DateTime<Utc>) -> Self {
        Self::ScheduleAt(at)
    }

    pub fn message_id(id: impl Into<String>) -> Self {
        Self::MessageId(id.into())
    }

    pub fn correlation_id(id: impl Into<String>) -> Self {
        Self::CorrelationId(id.into())
    }

    pub fn property(name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        Self::Property {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn custom<F>(name: impl Into<String>, apply: F) -> Self
    where
        F: Fn(&mut OutgoingMessage) -> Result<(), OptionError> + Send + Sync + 'static,
    {
        Self::Custom {
            name: name.into(),
            apply: Arc::new(apply),
        }
    }

    /// Name used in errors and logs.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Delay(_) => "delay",
            Self::ScheduleAt(_) => "schedule_at",
            Self::MessageId(_) => "message_id",
            Self::CorrelationId(_) => "correlation_id",
            Self::Property { .. } => "property",
            Self::Custom { name, .. } => name,
        }
    }

    pub(crate) fn apply(
        &self,
        message: &mut OutgoingMessage,
        clock: &dyn TimeSource,
    ) -> Result<(), OptionError> {
        match self {
            Self::Delay(delay) => {
                let at = chrono::Duration::from_std(*delay)
                    .ok()
                    .and_then(|d| clock.now().checked_add_signed(d))
                    .ok_or_else(|| {
                        OptionError::new(self.name(), format!("delay {delay:?} out of range"))
                    })?;
                message.scheduled_enqueue_time = Some(at);
            }
            Self::ScheduleAt(at) => message.scheduled_enqueue_time = Some(*at),
            Self::MessageId(id) => {
                if id.is_empty() {
                    return Err(OptionError::new(self.name(), "message ID cannot be empty"));
                }
                message.message_id = Some(id.clone());
            }
            Self::CorrelationId(id) => {
                if id.is_empty() {
                    return Err(OptionError::new(
                        self.name(),
                        "correlation ID cannot be empty",
                    ));
                }
                message.correlation_id = Some(id.clone());
            }
            Self::Property { name, value } => {
                if name == TYPE_PROPERTY {
                    return Err(OptionError::new(
                        self.name(),
                        format!("`{TYPE_PROPERTY}` is reserved for the payload type"),
                    ));
                }
                message.set_property(name.clone(), value.clone());
            }
            Self::Custom { name, apply } => {
                let type_tag = message.property(TYPE_PROPERTY).cloned();
                apply(message)?;
                if message.property(TYPE_PROPERTY) != type_tag.as_ref() {
                    return Err(OptionError::new(
                        name.clone(),
                        format!("`{TYPE_PROPERTY}` is reserved for the payload type"),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PublishOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delay(d) => f.debug_tuple("Delay").field(d).finish(),
            Self::ScheduleAt(at) => f.debug_tuple("ScheduleAt").field(at).finish(),
            Self::MessageId(id) => f.debug_tuple("MessageId").field(id).finish(),
            Self::CorrelationId(id) => f.debug_tuple("CorrelationId").field(id).finish(),
            Self::Property { name, value } => f
                .debug_struct("Property")
                .field("name", name)
                .field("value", value)
                .finish(),
            Self::Custom { name, .. } => f.debug_struct("Custom").field("name", name).finish(),
        }
    }
}
