//! Publisher configuration with validation.
//!
//! Deserializable with serde, or read from `BUS_*` environment variables.

use crate::domain::{PublisherError, TopicSetting};
use crate::service::{
    set_default_header, set_duplicate_detection, set_max_size_megabytes,
    set_message_time_to_live, with_connection_string, with_managed_identity_client_id,
    with_managed_identity_resource_id, ManagementOption, PublisherBuilder,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Topic name is required")]
    MissingTopic,

    #[error("Managed identity requires a namespace name")]
    MissingNamespace,

    #[error("Conflicting credentials: {0}")]
    ConflictingCredentials(String),

    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: String, value: String },

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

impl From<ConfigError> for PublisherError {
    fn from(err: ConfigError) -> Self {
        Self::Configuration(err.to_string())
    }
}

/// Declarative publisher configuration.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Topic to publish to.
    pub topic: String,
    /// Shared access connection string.
    pub connection_string: Option<String>,
    /// Namespace name, required for managed identity.
    pub namespace: Option<String>,
    /// User-assigned managed identity client ID.
    pub managed_identity_client_id: Option<String>,
    /// User-assigned managed identity resource ID.
    pub managed_identity_resource_id: Option<String>,
    /// header name → payload field key
    pub default_headers: BTreeMap<String, String>,
    /// Enable duplicate detection (default window unless one is given).
    pub duplicate_detection: bool,
    /// Duplicate detection window in seconds; implies `duplicate_detection`.
    pub duplicate_detection_window_secs: Option<u64>,
    /// Default message time-to-live in seconds.
    pub message_ttl_secs: Option<u64>,
    /// Maximum topic size in megabytes.
    pub max_size_megabytes: Option<u32>,
    /// Reject more than one credential strategy.
    pub exclusive_credentials: bool,
}

impl PublisherConfig {
    /// Read configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `BUS_TOPIC`: Topic name
    /// - `BUS_CONNECTION_STRING`: Connection string
    /// - `BUS_NAMESPACE`: Namespace name (managed identity)
    /// - `BUS_MANAGED_IDENTITY_CLIENT_ID`: Managed identity client ID
    /// - `BUS_MANAGED_IDENTITY_RESOURCE_ID`: Managed identity resource ID
    /// - `BUS_DEFAULT_HEADERS`: `header=field` pairs, comma separated
    /// - `BUS_DUPLICATE_DETECTION`: Enable duplicate detection (default: false)
    /// - `BUS_DUPLICATE_DETECTION_WINDOW_SECS`: Duplicate detection window
    /// - `BUS_MESSAGE_TTL_SECS`: Default message time-to-live
    /// - `BUS_MAX_SIZE_MB`: Maximum topic size
    /// - `BUS_EXCLUSIVE_CREDENTIALS`: Reject multiple credentials (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Ok(Self {
            topic: var("BUS_TOPIC").unwrap_or_default(),
            connection_string: var("BUS_CONNECTION_STRING"),
            namespace: var("BUS_NAMESPACE"),
            managed_identity_client_id: var("BUS_MANAGED_IDENTITY_CLIENT_ID"),
            managed_identity_resource_id: var("BUS_MANAGED_IDENTITY_RESOURCE_ID"),
            default_headers: var("BUS_DEFAULT_HEADERS")
                .map(|raw| parse_headers(&raw))
                .transpose()?
                .unwrap_or_default(),
            duplicate_detection: var("BUS_DUPLICATE_DETECTION")
                .map(|v| parse_var("BUS_DUPLICATE_DETECTION", &v))
                .transpose()?
                .unwrap_or(false),
            duplicate_detection_window_secs: var("BUS_DUPLICATE_DETECTION_WINDOW_SECS")
                .map(|v| parse_var("BUS_DUPLICATE_DETECTION_WINDOW_SECS", &v))
                .transpose()?,
            message_ttl_secs: var("BUS_MESSAGE_TTL_SECS")
                .map(|v| parse_var("BUS_MESSAGE_TTL_SECS", &v))
                .transpose()?,
            max_size_megabytes: var("BUS_MAX_SIZE_MB")
                .map(|v| parse_var("BUS_MAX_SIZE_MB", &v))
                .transpose()?,
            exclusive_credentials: var("BUS_EXCLUSIVE_CREDENTIALS")
                .map(|v| parse_var("BUS_EXCLUSIVE_CREDENTIALS", &v))
                .transpose()?
                .unwrap_or(false),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.topic.trim().is_empty() {
            return Err(ConfigError::MissingTopic);
        }

        let managed_identity =
            self.managed_identity_client_id.is_some() || self.managed_identity_resource_id.is_some();

        if self.connection_string.is_some() && managed_identity {
            return Err(ConfigError::ConflictingCredentials(
                "connection string and managed identity both set".into(),
            ));
        }
        if self.managed_identity_client_id.is_some() && self.managed_identity_resource_id.is_some()
        {
            return Err(ConfigError::ConflictingCredentials(
                "managed identity client ID and resource ID both set".into(),
            ));
        }
        if managed_identity && self.namespace.is_none() {
            return Err(ConfigError::MissingNamespace);
        }

        for setting in self.topic_settings() {
            setting.validate().map_err(ConfigError::InvalidSetting)?;
        }
        Ok(())
    }

    fn topic_settings(&self) -> Vec<TopicSetting> {
        let mut settings = Vec::new();
        if self.duplicate_detection || self.duplicate_detection_window_secs.is_some() {
            settings.push(TopicSetting::duplicate_detection(
                self.duplicate_detection_window_secs.map(Duration::from_secs),
            ));
        }
        if let Some(ttl) = self.message_ttl_secs {
            settings.push(TopicSetting::DefaultMessageTimeToLive(Duration::from_secs(ttl)));
        }
        if let Some(size) = self.max_size_megabytes {
            settings.push(TopicSetting::MaxSizeInMegabytes(size));
        }
        settings
    }

    /// The configuration as an ordered option list: credential, headers,
    /// then topic settings.
    pub fn management_options(&self) -> Vec<ManagementOption> {
        let mut options = Vec::new();

        if let Some(conn) = &self.connection_string {
            options.push(with_connection_string(conn.clone()));
        } else if let Some(namespace) = &self.namespace {
            let option = match (
                &self.managed_identity_resource_id,
                &self.managed_identity_client_id,
            ) {
                (Some(resource_id), _) => {
                    with_managed_identity_resource_id(namespace.clone(), resource_id.clone())
                }
                // No client ID selects the system-assigned identity.
                (None, client_id) => with_managed_identity_client_id(
                    namespace.clone(),
                    client_id.clone().unwrap_or_default(),
                ),
            };
            options.push(option);
        }

        for (header, field) in &self.default_headers {
            options.push(set_default_header(header.clone(), field.clone()));
        }

        for setting in self.topic_settings() {
            options.push(match setting {
                TopicSetting::DuplicateDetection { window } => set_duplicate_detection(Some(window)),
                TopicSetting::DefaultMessageTimeToLive(ttl) => set_message_time_to_live(ttl),
                TopicSetting::MaxSizeInMegabytes(size) => set_max_size_megabytes(size),
            });
        }

        options
    }
}

impl fmt::Debug for PublisherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublisherConfig")
            .field("topic", &self.topic)
            .field(
                "connection_string",
                &self.connection_string.as_ref().map(|_| "<redacted>"),
            )
            .field("namespace", &self.namespace)
            .field("managed_identity_client_id", &self.managed_identity_client_id)
            .field("managed_identity_resource_id", &self.managed_identity_resource_id)
            .field("default_headers", &self.default_headers)
            .field("duplicate_detection", &self.duplicate_detection)
            .field(
                "duplicate_detection_window_secs",
                &self.duplicate_detection_window_secs,
            )
            .field("message_ttl_secs", &self.message_ttl_secs)
            .field("max_size_megabytes", &self.max_size_megabytes)
            .field("exclusive_credentials", &self.exclusive_credentials)
            .finish()
    }
}

impl PublisherBuilder {
    /// Validate `config` and turn it into a builder.
    pub fn from_config(config: &PublisherConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.topic.clone())
            .exclusive_credentials(config.exclusive_credentials)
            .options(config.management_options()))
    }
}

fn parse_var<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var: var.to_string(),
        value: value.to_string(),
    })
}

/// Parse `a=x,b=y` into a header table.
fn parse_headers(raw: &str) -> Result<BTreeMap<String, String>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            pair.split_once('=')
                .map(|(h, f)| (h.trim().to_string(), f.trim().to_string()))
                .filter(|(h, f)| !h.is_empty() && !f.is_empty())
                .ok_or_else(|| ConfigError::InvalidValue {
                    var: "BUS_DEFAULT_HEADERS".into(),
                    value: pair.to_string(),
                })
        })
        .collect()
}
