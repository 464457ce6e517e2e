//! # Namespace Resolver
//!
//! Turns a credential strategy into a live namespace handle.

use crate::context::CallContext;
use crate::domain::{CredentialStrategy, PublisherError, Result, Stage};
use crate::ports::{Namespace, NamespaceConnector};
use std::sync::Arc;
use bus_telemetry::log_event;

/// Validate `strategy`, then authenticate through `connector`.
///
/// Validation failures are reported as `Configuration` before the
/// connector is touched.
pub async fn resolve_namespace(
    ctx: &CallContext,
    connector: &dyn NamespaceConnector,
    strategy: &CredentialStrategy,
) -> Result<Arc<dyn Namespace>> {
    strategy.validate().map_err(PublisherError::Configuration)?;

    log_event!(debug, "namespace", "Resolving namespace", strategy = strategy.kind());

    let namespace = ctx
        .run(Stage::ResolveNamespace, async {
            connector
                .connect(ctx, strategy)
                .await
                .map_err(|source| PublisherError::Authentication {
                    strategy: strategy.kind(),
                    source,
                })
        })
        .await
        .inspect_err(|e| {
            log_event!(
                warn,
                "namespace",
                "Namespace resolution failed",
                strategy = strategy.kind(),
                error = %e
            )
        })?;

    log_event!(
        debug,
        "namespace",
        "Namespace resolved",
        strategy = strategy.kind(),
        namespace = namespace.name()
    );
    Ok(namespace)
}
