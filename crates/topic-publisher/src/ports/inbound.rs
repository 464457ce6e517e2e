//! # Inbound Ports
//!
//! The API a built publisher offers to application code.

use crate::context::CallContext;
use crate::domain::{Payload, Result};
use crate::service::PublishOption;
use async_trait::async_trait;

/// Publishing API - inbound port.
///
/// Application code should depend on this trait rather than on
/// [`crate::Publisher`] so it can be exercised without a transport.
#[async_trait]
pub trait TopicPublisherApi: Send + Sync {
    /// Topic the publisher is bound to.
    fn topic_name(&self) -> &str;

    /// Encode, decorate and send one payload.
    async fn publish<P>(&self, ctx: &CallContext, payload: &P, options: &[PublishOption]) -> Result<()>
    where
        P: Payload + Sync;
}
