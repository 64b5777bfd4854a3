use anyhow::{Context, Result};
use pingwire_core::{
    CandidatePayload, IceServerConfig, SessionDescriptionPayload, SignalMessage, rtc_ice_servers,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;

use super::ws_setup_impl::SignalSender;
use crate::PingEngine;

impl PingEngine {
    pub(super) async fn create_pc(
        ice_servers: &[IceServerConfig],
        signal_tx: SignalSender,
    ) -> Result<Arc<RTCPeerConnection>> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: rtc_ice_servers(ice_servers),
            ..Default::default()
        };
        let pc = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        pc.on_peer_connection_state_change(Box::new(move |state| {
            info!("Peer connection state: {}", state);
            Box::pin(async {})
        }));

        pc.on_ice_candidate(Box::new(move |candidate| {
            let signal_tx = signal_tx.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else {
                    debug!("ICE gathering complete");
                    return;
                };
                match candidate.to_json() {
                    Ok(init) => {
                        let msg = SignalMessage::Candidate(CandidatePayload::from(init));
                        let _ = signal_tx.send(msg);
                    }
                    Err(e) => warn!("Failed to serialize ICE candidate: {}", e),
                }
            })
        }));

        Ok(pc)
    }

    pub(super) async fn send_offer(
        pc: &RTCPeerConnection,
        signal_tx: &SignalSender,
    ) -> Result<()> {
        let offer = pc.create_offer(None).await.context("Failed to create offer")?;

        // Queued before gathering starts so no candidate overtakes it.
        info!("Sending OFFER to server...");
        signal_tx
            .send(SignalMessage::Offer(SessionDescriptionPayload::offer(
                offer.sdp.clone(),
            )))
            .context("Signaling socket closed")?;

        pc.set_local_description(offer)
            .await
            .context("Failed to set local description")?;
        Ok(())
    }
}

