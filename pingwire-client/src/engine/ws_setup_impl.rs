use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use pingwire_core::SignalMessage;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::PingEngine;

pub(crate) type SignalSender = mpsc::UnboundedSender<SignalMessage>;

impl PingEngine {
    /// Opens the signaling socket and returns its two halves as channels of
    /// decoded messages, plus the tasks pumping them.
    pub(super) async fn ws_setup(
        url: &str,
    ) -> Result<(
        SignalSender,
        mpsc::UnboundedReceiver<SignalMessage>,
        Vec<JoinHandle<()>>,
    )> {
        let (ws, _) = connect_async(url)
            .await
            .with_context(|| format!("Failed to connect to {}", url))?;
        info!("WS Open");

        let (mut sink, mut stream) = ws.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<SignalMessage>();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        let writer = tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let text = match msg.encode() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Failed to encode {} message: {}", msg.message_type(), e);
                        continue;
                    }
                };
                debug!("WS OUT: {}", text);
                if sink.send(Message::text(text)).await.is_err() {
                    break;
                }
            }
        });

        let reader = tokio::spawn(async move {
            while let Some(Ok(frame)) = stream.next().await {
                let Message::Text(text) = frame else {
                    continue;
                };
                debug!("WS IN: {}", text.as_str());

                match SignalMessage::decode(text.as_str()) {
                    Ok(msg) => {
                        if in_tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Ignoring signaling frame: {}", e),
                }
            }
            info!("WS Closed");
        });

        Ok((out_tx, in_rx, vec![writer, reader]))
    }
}
