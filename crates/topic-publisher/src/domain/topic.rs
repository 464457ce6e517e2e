//! # Topic Entity
//!
//! Topic settings applied at provisioning time and the entity the service
//! returns for an existing or newly created topic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Duplicate detection window used when none is given.
pub const DEFAULT_DUPLICATE_DETECTION_WINDOW: Duration = Duration::from_secs(30);

/// Longest duplicate detection window the service accepts (7 days).
pub const MAX_DUPLICATE_DETECTION_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Topic sizes the service accepts, in megabytes.
pub const ALLOWED_MAX_SIZES_MB: [u32; 5] = [1024, 2048, 3072, 4096, 5120];

/// A setting replayed once when a topic is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopicSetting {
    /// Suppress messages with a repeated ID inside `window`.
    DuplicateDetection { window: Duration },
    /// Default time-to-live for messages without one.
    DefaultMessageTimeToLive(Duration),
    /// Maximum topic size.
    MaxSizeInMegabytes(u32),
}

impl TopicSetting {
    /// Duplicate detection with the service default when `window` is `None`.
    #[must_use]
    pub fn duplicate_detection(window: Option<Duration>) -> Self {
        Self::DuplicateDetection {
            window: window.unwrap_or(DEFAULT_DUPLICATE_DETECTION_WINDOW),
        }
    }

    /// Short name used in logs and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::DuplicateDetection { .. } => "duplicate_detection",
            Self::DefaultMessageTimeToLive(_) => "default_message_ttl",
            Self::MaxSizeInMegabytes(_) => "max_size_megabytes",
        }
    }

    /// Check the value against service limits.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::DuplicateDetection { window } => {
                if window.is_zero() {
                    return Err("duplicate detection window cannot be 0".into());
                }
                if *window > MAX_DUPLICATE_DETECTION_WINDOW {
                    return Err(format!(
                        "duplicate detection window {}s exceeds maximum of {}s",
                        window.as_secs(),
                        MAX_DUPLICATE_DETECTION_WINDOW.as_secs()
                    ));
                }
                Ok(())
            }
            Self::DefaultMessageTimeToLive(ttl) => {
                if ttl.is_zero() {
                    return Err("default message time-to-live cannot be 0".into());
                }
                Ok(())
            }
            Self::MaxSizeInMegabytes(size) => {
                if !ALLOWED_MAX_SIZES_MB.contains(size) {
                    return Err(format!(
                        "max size {size}MB not one of {ALLOWED_MAX_SIZES_MB:?}"
                    ));
                }
                Ok(())
            }
        }
    }
}

/// A topic as known to the service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicEntity {
    /// Stable identity assigned at creation.
    pub id: Uuid,
    /// Topic name, unique within a namespace.
    pub name: String,
    /// Settings the topic was created with.
    pub settings: Vec<TopicSetting>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl TopicEntity {
    /// A freshly created entity with a new identity.
    pub fn new(name: impl Into<String>, settings: Vec<TopicSetting>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            settings,
            created_at: Utc::now(),
        }
    }

    /// Duplicate detection window, if enabled. The last setting wins.
    #[must_use]
    pub fn duplicate_detection_window(&self) -> Option<Duration> {
        self.settings.iter().rev().find_map(|s| match s {
            TopicSetting::DuplicateDetection { window } => Some(*window),
            _ => None,
        })
    }
}
