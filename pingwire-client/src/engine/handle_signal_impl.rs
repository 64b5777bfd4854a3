use anyhow::Result;
use pingwire_core::SignalMessage;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

use crate::PingEngine;

impl PingEngine {
    pub(super) fn spawn_signal_loop(
        pc: Arc<RTCPeerConnection>,
        mut signal_rx: mpsc::UnboundedReceiver<SignalMessage>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(msg) = signal_rx.recv().await {
                let message_type = msg.message_type();
                if let Err(e) = Self::handle_signal(&pc, msg).await {
                    warn!("Failed to apply {}: {:?}", message_type, e);
                }
            }
        })
    }

    pub(super) async fn handle_signal(pc: &RTCPeerConnection, msg: SignalMessage) -> Result<()> {
        match msg {
            SignalMessage::Answer(answer) => {
                info!("Received Answer from Server");
                pc.set_remote_description(RTCSessionDescription::answer(answer.sdp)?)
                    .await?;
            }

            SignalMessage::Candidate(candidate) => {
                info!("Adding ICE: {}", candidate.candidate);
                pc.add_ice_candidate(RTCIceCandidateInit::from(candidate))
                    .await?;
            }

            SignalMessage::Offer(_) => {
                warn!("Ignoring offer from server: this client only offers");
            }
        }
        Ok(())
    }
}
