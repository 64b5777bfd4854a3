use crate::transport::transport_config::TransportConfig;
use crate::transport::transport_event::TransportEvent;
use anyhow::{Context, Result};
use pingwire_core::{CandidatePayload, ConnectionId, rtc_ice_servers};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// One engine peer connection, answering side.
///
/// Engine callbacks never touch session state; they only post
/// [`TransportEvent`]s tagged with `generation` into the session loop.
pub struct ConnectionWrapper {
    pub connection_id: ConnectionId,
    pub generation: u64,
    pub peer_connection: Arc<RTCPeerConnection>,
}

impl ConnectionWrapper {
    pub async fn new(
        connection_id: ConnectionId,
        generation: u64,
        config: &TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        // Codecs are registered even though only data channels are negotiated,
        // otherwise offers carrying media sections cannot be answered.
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: rtc_ice_servers(&config.ice_servers),
            ..Default::default()
        };

        let peer_connection = Arc::new(
            api.new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        let state_tx = event_tx.clone();
        let cid_state = connection_id.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                let cid = cid_state.clone();

                Box::pin(async move {
                    info!("Peer connection state for {}: {}", cid, s);
                    let _ = tx.send(TransportEvent::StateChanged(generation, s)).await;
                })
            },
        ));

        let cid_ice_state = connection_id.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |s: RTCIceConnectionState| {
                let cid = cid_ice_state.clone();
                Box::pin(async move {
                    debug!("ICE connection state for {}: {}", cid, s);
                })
            },
        ));

        let ice_tx = event_tx.clone();
        let cid_ice = connection_id.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let cid = cid_ice.clone();

            Box::pin(async move {
                // None marks the end of gathering.
                let Some(candidate) = c else { return };
                let init = match candidate.to_json() {
                    Ok(init) => init,
                    Err(e) => {
                        warn!("Failed to serialize local candidate for {}: {}", cid, e);
                        return;
                    }
                };
                let _ = tx
                    .send(TransportEvent::CandidateGenerated(
                        generation,
                        CandidatePayload::from(init),
                    ))
                    .await;
            })
        }));

        let dc_tx = event_tx.clone();
        let cid_dc = connection_id.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();
            let cid = cid_dc.clone();

            Box::pin(async move {
                debug!(
                    "Remote peer {} opened data channel '{}' (ordered: {}, max retransmits: {:?})",
                    cid,
                    dc.label(),
                    dc.ordered(),
                    dc.max_retransmits()
                );
                Self::register_channel(dc, generation, tx);
            })
        }));

        Ok(Self {
            connection_id,
            generation,
            peer_connection,
        })
    }

    fn register_channel(
        dc: Arc<RTCDataChannel>,
        generation: u64,
        tx: mpsc::Sender<TransportEvent>,
    ) {
        let dc_open = dc.clone();
        let tx_open = tx.clone();
        dc.on_open(Box::new(move || {
            let tx = tx_open.clone();
            let channel = dc_open.clone();
            Box::pin(async move {
                let _ = tx
                    .send(TransportEvent::DataChannelReady(generation, channel))
                    .await;
            })
        }));

        let dc_close = dc.clone();
        let tx_close = tx.clone();
        dc.on_close(Box::new(move || {
            let tx = tx_close.clone();
            let channel = dc_close.clone();
            Box::pin(async move {
                let _ = tx
                    .send(TransportEvent::DataChannelClosed(generation, channel))
                    .await;
            })
        }));

        let dc_msg = dc.clone();
        dc.on_message(Box::new(move |msg: DataChannelMessage| {
            let tx = tx.clone();
            let channel = dc_msg.clone();
            Box::pin(async move {
                let _ = tx
                    .send(TransportEvent::Message(generation, channel, msg.data))
                    .await;
            })
        }));
    }

    /// Parses `sdp` as an offer and applies it as the remote description.
    pub async fn set_remote_offer(&self, sdp: String) -> Result<()> {
        let desc = RTCSessionDescription::offer(sdp).context("Failed to parse SDP offer")?;
        self.peer_connection
            .set_remote_description(desc)
            .await
            .context("Failed to set remote description")?;
        Ok(())
    }

    /// Generates the local answer, applies it as the local description and
    /// returns its SDP text. Applying it starts local candidate gathering.
    pub async fn create_answer(&self) -> Result<String> {
        let answer = self
            .peer_connection
            .create_answer(None)
            .await
            .context("Failed to create answer")?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await
            .context("Failed to set local description")?;
        Ok(answer.sdp)
    }

    pub async fn add_ice_candidate(&self, candidate: CandidatePayload) -> Result<()> {
        self.peer_connection
            .add_ice_candidate(RTCIceCandidateInit::from(candidate))
            .await
            .context("Failed to add remote ICE candidate")?;
        Ok(())
    }

    pub async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}
