use crate::session::context::ChannelContext;
use async_trait::async_trait;
use bytes::Bytes;

/// Application hooks for the data channel a remote peer opens.
///
/// Every hook defaults to a no-op, so implementors override only what they
/// care about.
#[async_trait]
pub trait ChannelBehavior: Send + Sync + 'static {
    async fn on_open(&self, _ctx: &ChannelContext) {}

    async fn on_message(&self, _ctx: &ChannelContext, _data: Bytes) {}

    async fn on_close(&self, _ctx: &ChannelContext) {}
}
