use anyhow::{Context, Result};
use bytes::Bytes;
use pingwire_core::{CandidatePayload, IceServerConfig, rtc_ice_servers};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Configuration for TestClient.
#[derive(Clone, Default)]
pub struct TestClientConfig {
    /// ICE servers to use (default: none, host candidates only).
    pub ice_servers: Vec<IceServerConfig>,
}

/// Offering peer, playing the part of the browser client.
pub struct TestClient {
    peer_connection: Arc<RTCPeerConnection>,
    data_channel: Mutex<Option<Arc<RTCDataChannel>>>,
    message_tx: mpsc::UnboundedSender<DataChannelMessage>,
    message_rx: Mutex<mpsc::UnboundedReceiver<DataChannelMessage>>,
    dc_open_tx: mpsc::Sender<()>,
    dc_open_rx: Mutex<mpsc::Receiver<()>>,
    connection_state: Arc<Mutex<RTCPeerConnectionState>>,
    candidates: Arc<Mutex<Vec<CandidatePayload>>>,
}

impl TestClient {
    pub async fn new(config: TestClientConfig) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: rtc_ice_servers(&config.ice_servers),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let (dc_open_tx, dc_open_rx) = mpsc::channel(1);
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let connection_state = Arc::new(Mutex::new(RTCPeerConnectionState::New));
        let candidates = Arc::new(Mutex::new(Vec::new()));

        let state_clone = Arc::clone(&connection_state);
        peer_connection.on_peer_connection_state_change(Box::new(move |state| {
            let state_clone = Arc::clone(&state_clone);
            Box::pin(async move {
                tracing::debug!("[TestClient] Connection state: {:?}", state);
                *state_clone.lock().await = state;
            })
        }));

        let candidates_clone = Arc::clone(&candidates);
        peer_connection.on_ice_candidate(Box::new(move |candidate| {
            let candidates = Arc::clone(&candidates_clone);
            Box::pin(async move {
                let Some(c) = candidate else { return };
                if let Ok(init) = c.to_json() {
                    tracing::debug!("[TestClient] ICE candidate generated");
                    candidates.lock().await.push(CandidatePayload::from(init));
                }
            })
        }));

        Ok(Self {
            peer_connection,
            data_channel: Mutex::new(None),
            message_tx,
            message_rx: Mutex::new(message_rx),
            dc_open_tx,
            dc_open_rx: Mutex::new(dc_open_rx),
            connection_state,
            candidates,
        })
    }

    /// Opens an unordered, unreliable data channel named `dc` and returns the
    /// SDP offer describing it.
    pub async fn create_offer(&self) -> Result<String> {
        let init = RTCDataChannelInit {
            ordered: Some(false),
            max_retransmits: Some(0),
            ..Default::default()
        };
        let dc = self
            .peer_connection
            .create_data_channel("dc", Some(init))
            .await
            .context("Failed to create data channel")?;

        let message_tx = self.message_tx.clone();
        dc.on_message(Box::new(move |msg: DataChannelMessage| {
            let message_tx = message_tx.clone();
            Box::pin(async move {
                tracing::debug!("[TestClient] Message received: {} bytes", msg.data.len());
                let _ = message_tx.send(msg);
            })
        }));

        let dc_open_tx = self.dc_open_tx.clone();
        dc.on_open(Box::new(move || {
            let dc_open_tx = dc_open_tx.clone();
            Box::pin(async move {
                tracing::debug!("[TestClient] Data channel opened");
                let _ = dc_open_tx.send(()).await;
            })
        }));

        *self.data_channel.lock().await = Some(dc);

        let offer = self
            .peer_connection
            .create_offer(None)
            .await
            .context("Failed to create offer")?;

        self.peer_connection
            .set_local_description(offer.clone())
            .await
            .context("Failed to set local description")?;

        Ok(offer.sdp)
    }

    /// Waits for ICE gathering to finish (or the timeout) and returns the
    /// candidates found so far.
    pub async fn gather_ice_candidates(&self, timeout_ms: u64) -> Vec<CandidatePayload> {
        let mut gathering_complete = self.peer_connection.gathering_complete_promise().await;

        if tokio::time::timeout(Duration::from_millis(timeout_ms), gathering_complete.recv())
            .await
            .is_err()
        {
            tracing::warn!("[TestClient] ICE gathering timeout");
        }

        self.candidates.lock().await.clone()
    }

    pub async fn set_remote_answer(&self, sdp: String) -> Result<()> {
        let answer = RTCSessionDescription::answer(sdp)?;
        self.peer_connection
            .set_remote_description(answer)
            .await
            .context("Failed to set remote description")?;
        Ok(())
    }

    pub async fn add_ice_candidate(&self, candidate: CandidatePayload) -> Result<()> {
        self.peer_connection
            .add_ice_candidate(RTCIceCandidateInit::from(candidate))
            .await
            .context("Failed to add ICE candidate")?;
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        *self.connection_state.lock().await == RTCPeerConnectionState::Connected
    }

    pub async fn wait_for_data_channel(&self, timeout_ms: u64) -> Result<()> {
        let mut rx = self.dc_open_rx.lock().await;
        match tokio::time::timeout(Duration::from_millis(timeout_ms), rx.recv()).await {
            Ok(Some(())) => Ok(()),
            Ok(None) => anyhow::bail!("Data channel open channel closed"),
            Err(_) => anyhow::bail!("Timeout waiting for data channel to open"),
        }
    }

    pub async fn send_text(&self, text: &str) -> Result<()> {
        let dc = self
            .data_channel
            .lock()
            .await
            .clone()
            .context("Data channel not available")?;

        dc.send_text(text.to_owned())
            .await
            .context("Failed to send message")?;
        Ok(())
    }

    pub async fn send_binary(&self, data: &[u8]) -> Result<()> {
        let dc = self
            .data_channel
            .lock()
            .await
            .clone()
            .context("Data channel not available")?;

        dc.send(&Bytes::copy_from_slice(data))
            .await
            .context("Failed to send message")?;
        Ok(())
    }

    pub async fn next_message(&self, timeout_ms: u64) -> Result<DataChannelMessage> {
        let mut rx = self.message_rx.lock().await;
        match tokio::time::timeout(Duration::from_millis(timeout_ms), rx.recv()).await {
            Ok(Some(msg)) => Ok(msg),
            Ok(None) => anyhow::bail!("Message channel closed"),
            Err(_) => anyhow::bail!("Timeout waiting for a data channel message"),
        }
    }

    pub async fn close(&self) -> Result<()> {
        self.peer_connection
            .close()
            .await
            .context("Failed to close peer connection")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creates_offer_with_data_channel() {
        let client = TestClient::new(TestClientConfig::default())
            .await
            .expect("Failed to create test client");

        let offer = client.create_offer().await.expect("Failed to create offer");

        assert!(offer.starts_with("v=0"));
        assert!(offer.contains("m=application"));
    }
}
