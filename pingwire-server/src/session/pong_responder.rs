use crate::session::channel_behavior::ChannelBehavior;
use crate::session::context::ChannelContext;
use async_trait::async_trait;
use bytes::Bytes;
use pingwire_core::PONG;
use tracing::{debug, info};

/// Answers every inbound message with [`PONG`], whatever it contains.
#[derive(Debug, Clone, Copy, Default)]
pub struct PongResponder;

#[async_trait]
impl ChannelBehavior for PongResponder {
    async fn on_open(&self, ctx: &ChannelContext) {
        info!(
            "Data channel '{}' ready for {}",
            ctx.label(),
            ctx.connection_id()
        );
    }

    async fn on_message(&self, ctx: &ChannelContext, data: Bytes) {
        debug!(
            "Data channel message from {}: {:?}",
            ctx.connection_id(),
            String::from_utf8_lossy(&data)
        );
        ctx.send_text(PONG).await;
    }
}
