//! # Credential Strategies
//!
//! How a publisher authenticates against its namespace. Exactly one
//! strategy is used per publisher; `Default` defers to the ambient
//! credential chain of the transport.

use std::fmt;

/// Authentication strategy for resolving a namespace.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum CredentialStrategy {
    /// Ambient/default credential resolution performed by the transport.
    #[default]
    Default,
    /// Shared access connection string.
    ConnectionString(String),
    /// Managed identity selected by its client ID.
    ManagedIdentityClientId {
        namespace: String,
        client_id: String,
    },
    /// Managed identity selected by its ARM resource ID.
    ManagedIdentityResourceId {
        namespace: String,
        resource_id: String,
    },
}

impl CredentialStrategy {
    /// Short name used in logs and errors.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::ConnectionString(_) => "connection-string",
            Self::ManagedIdentityClientId { .. } => "managed-identity-client-id",
            Self::ManagedIdentityResourceId { .. } => "managed-identity-resource-id",
        }
    }

    /// Check the required identifier is present.
    ///
    /// An empty managed identity ID is allowed; the service then falls back
    /// to the system-assigned identity.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Default => Ok(()),
            Self::ConnectionString(s) if s.trim().is_empty() => {
                Err("no Service Bus connection string provided".into())
            }
            Self::ManagedIdentityClientId { namespace, .. }
            | Self::ManagedIdentityResourceId { namespace, .. }
                if namespace.trim().is_empty() =>
            {
                Err("no Service Bus namespace provided".into())
            }
            _ => Ok(()),
        }
    }

    /// Namespace name, when the strategy names one explicitly.
    #[must_use]
    pub fn namespace_name(&self) -> Option<&str> {
        match self {
            Self::ManagedIdentityClientId { namespace, .. }
            | Self::ManagedIdentityResourceId { namespace, .. } => Some(namespace),
            Self::ConnectionString(s) => connection_string_endpoint(s),
            Self::Default => None,
        }
    }
}

/// Extract the namespace host from `Endpoint=sb://<host>/;...`.
fn connection_string_endpoint(conn: &str) -> Option<&str> {
    conn.split(';')
        .filter_map(|part| part.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("endpoint"))
        .map(|(_, value)| {
            let value = value.trim();
            let value = value.strip_prefix("sb://").unwrap_or(value);
            value.trim_end_matches('/')
        })
        .filter(|host| !host.is_empty())
}

// Secrets never reach logs.
impl fmt::Debug for CredentialStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("Default"),
            Self::ConnectionString(s) => f
                .debug_struct("ConnectionString")
                .field("endpoint", &connection_string_endpoint(s))
                .finish_non_exhaustive(),
            Self::ManagedIdentityClientId {
                namespace,
                client_id,
            } => f
                .debug_struct("ManagedIdentityClientId")
                .field("namespace", namespace)
                .field("client_id", client_id)
                .finish(),
            Self::ManagedIdentityResourceId {
                namespace,
                resource_id,
            } => f
                .debug_struct("ManagedIdentityResourceId")
                .field("namespace", namespace)
                .field("resource_id", resource_id)
                .finish(),
        }
    }
}

impl fmt::Display for CredentialStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
