use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::peer_connection::RTCPeerConnection;

use crate::{ConnectionState, PingEngine};

const DATA_CHANNEL_LABEL: &str = "dc";

impl PingEngine {
    /// Creates the unordered, no-retransmit `dc` channel and wires its
    /// callbacks before the offer is made.
    pub(super) async fn setup_data_channel(
        pc: &RTCPeerConnection,
        state_tx: watch::Sender<ConnectionState>,
        message_tx: mpsc::UnboundedSender<DataChannelMessage>,
    ) -> Result<Arc<RTCDataChannel>> {
        let init = RTCDataChannelInit {
            ordered: Some(false),
            max_retransmits: Some(0),
            ..Default::default()
        };
        let dc = pc
            .create_data_channel(DATA_CHANNEL_LABEL, Some(init))
            .await
            .context("Failed to create data channel")?;

        let state_tx = Arc::new(state_tx);

        let open_state = state_tx.clone();
        dc.on_open(Box::new(move || {
            info!("DataChannel OPEN");
            open_state.send_replace(ConnectionState::Connected);
            Box::pin(async {})
        }));

        let close_state = state_tx;
        dc.on_close(Box::new(move || {
            info!("DataChannel CLOSED");
            close_state.send_replace(ConnectionState::Disconnected);
            Box::pin(async {})
        }));

        dc.on_message(Box::new(move |msg: DataChannelMessage| {
            debug!("DataChannel message: {} bytes", msg.data.len());
            let _ = message_tx.send(msg);
            Box::pin(async {})
        }));

        Ok(dc)
    }
}
