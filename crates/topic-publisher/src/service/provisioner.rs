//! # Topic Provisioner
//!
//! Get-or-create for topic entities.
//!
//! ```text
//! get(name) ──ok──────────────→ existing entity (settings NOT reapplied)
//!     │
//!     ├─ NotFound ──→ put(name, settings) ──ok──→ new entity
//!     │                        └─err──→ Provisioning
//!     └─ other error ─────────────────────────→ Provisioning
//! ```
//!
//! Only a definitive not-found triggers creation, so a transient lookup
//! failure never causes a spurious `put`. Settings drift on an existing
//! topic is not detected.

use crate::context::CallContext;
use crate::domain::{
    PublisherError, Result, Stage, TopicCall, TopicEntity, TopicSetting, TransportError,
};
use crate::ports::Namespace;
use bus_telemetry::log_event;

/// Ensure topic `name` exists in `namespace`, creating it with `settings`
/// if it does not.
pub async fn ensure_topic(
    ctx: &CallContext,
    name: &str,
    namespace: &dyn Namespace,
    settings: &[TopicSetting],
) -> Result<TopicEntity> {
    let manager = namespace.topic_manager();
    let provisioning = |call: TopicCall, source: TransportError| PublisherError::Provisioning {
        topic: name.to_string(),
        call,
        source,
    };

    let existing = ctx
        .run(Stage::Provision, async {
            match manager.get(ctx, name).await {
                Ok(entity) => Ok(Some(entity)),
                Err(e) if e.is_not_found() => Ok(None),
                Err(e) => Err(provisioning(TopicCall::Get, e)),
            }
        })
        .await?;

    if let Some(entity) = existing {
        log_event!(
            debug,
            "provisioner",
            "Topic exists, settings not reapplied",
            topic = name,
            id = %entity.id
        );
        return Ok(entity);
    }

    let entity = ctx
        .run(Stage::Provision, async {
            manager.put(ctx, name, settings).await.map_err(|e| provisioning(TopicCall::Put, e))
        })
        .await?;

    log_event!(
        info,
        "provisioner",
        "Topic created",
        topic = name,
        id = %entity.id,
        settings = settings.len()
    );
    Ok(entity)
}
