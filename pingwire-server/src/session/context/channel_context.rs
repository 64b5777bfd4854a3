use bytes::Bytes;
use pingwire_core::ConnectionId;
use std::sync::Arc;
use tracing::error;
use webrtc::data_channel::RTCDataChannel;

/// Handle a [`ChannelBehavior`] uses to talk back on the active channel.
///
/// [`ChannelBehavior`]: crate::ChannelBehavior
#[derive(Clone)]
pub struct ChannelContext {
    connection_id: ConnectionId,
    channel: Arc<RTCDataChannel>,
}

impl ChannelContext {
    pub(crate) fn new(connection_id: ConnectionId, channel: Arc<RTCDataChannel>) -> Self {
        Self {
            connection_id,
            channel,
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    pub fn label(&self) -> &str {
        self.channel.label()
    }

    /// Sends `data` as a binary message. Delivery follows the channel's own
    /// reliability settings; failures are logged.
    pub async fn send(&self, data: Bytes) {
        if let Err(e) = self.channel.send(&data).await {
            error!(
                "Failed to send on data channel '{}' for {}: {}",
                self.channel.label(),
                self.connection_id,
                e
            );
        }
    }

    /// Same as [`send`](Self::send) but tagged as a text message.
    pub async fn send_text(&self, text: &str) {
        if let Err(e) = self.channel.send_text(text.to_owned()).await {
            error!(
                "Failed to send text on data channel '{}' for {}: {}",
                self.channel.label(),
                self.connection_id,
                e
            );
        }
    }
}
