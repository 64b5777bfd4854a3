use anyhow::{Context, Result};
use pingwire_core::{IceServerConfig, PING};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::peer_connection::RTCPeerConnection;

mod create_pc_impl;
mod handle_signal_impl;
mod setup_data_channel_impl;
mod ws_setup_impl;

pub const DEFAULT_SERVER_URL: &str = "ws://127.0.0.1:8080/";

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub url: String,
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_owned(),
            ice_servers: IceServerConfig::defaults(),
        }
    }
}

/// Pingwire client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Offering side of the demo: opens the `dc` channel, negotiates it over the
/// signaling socket and sends `PING`.
pub struct PingEngine {
    peer_connection: Arc<RTCPeerConnection>,
    data_channel: Arc<RTCDataChannel>,
    state_rx: watch::Receiver<ConnectionState>,
    message_rx: Mutex<mpsc::UnboundedReceiver<DataChannelMessage>>,
    tasks: Vec<JoinHandle<()>>,
}

impl PingEngine {
    pub async fn connect(config: EngineConfig) -> Result<Self> {
        info!("Connecting to {}", config.url);
        let (signal_tx, signal_rx, mut tasks) = Self::ws_setup(&config.url).await?;

        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (message_tx, message_rx) = mpsc::unbounded_channel();

        let peer_connection = Self::create_pc(&config.ice_servers, signal_tx.clone()).await?;
        let data_channel =
            Self::setup_data_channel(&peer_connection, state_tx, message_tx).await?;

        Self::send_offer(&peer_connection, &signal_tx).await?;
        tasks.push(Self::spawn_signal_loop(peer_connection.clone(), signal_rx));

        Ok(Self {
            peer_connection,
            data_channel,
            state_rx,
            message_rx: Mutex::new(message_rx),
            tasks,
        })
    }

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    pub async fn wait_connected(&self, timeout: Duration) -> Result<()> {
        let mut state_rx = self.state_rx.clone();
        let wait = state_rx.wait_for(|state| *state != ConnectionState::Connecting);

        match tokio::time::timeout(timeout, wait).await {
            Ok(Ok(state)) if *state == ConnectionState::Connected => Ok(()),
            Ok(_) => anyhow::bail!("Data channel closed before opening"),
            Err(_) => anyhow::bail!("Timed out waiting for the data channel to open"),
        }
    }

    pub async fn send_text(&self, text: &str) -> Result<()> {
        self.data_channel
            .send_text(text.to_owned())
            .await
            .context("Failed to send on data channel")?;
        Ok(())
    }

    pub async fn recv(&self, timeout: Duration) -> Result<DataChannelMessage> {
        let mut rx = self.message_rx.lock().await;
        match tokio::time::timeout(timeout, rx.recv()).await {
            Ok(Some(msg)) => Ok(msg),
            Ok(None) => anyhow::bail!("Data channel closed"),
            Err(_) => anyhow::bail!("Timed out waiting for a reply"),
        }
    }

    /// Sends `PING` and returns the first reply as text.
    pub async fn ping(&self, timeout: Duration) -> Result<String> {
        self.send_text(PING).await?;
        debug!("PING sent");

        let reply = self.recv(timeout).await?;
        Ok(String::from_utf8_lossy(&reply.data).into_owned())
    }

    pub async fn close(self) -> Result<()> {
        for task in &self.tasks {
            task.abort();
        }
        self.peer_connection
            .close()
            .await
            .context("Failed to close peer connection")?;
        Ok(())
    }
}
