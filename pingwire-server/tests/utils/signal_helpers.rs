use anyhow::{Context, Result};
use pingwire_server::SessionCommand;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use super::mock_signaling::CapturedSignal;
use super::test_client::TestClient;

/// Timeout for signal exchange operations (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

/// Timeout for ICE gathering (ms).
pub const ICE_GATHERING_TIMEOUT_MS: u64 = 3000;

/// Timeout for data channel opening (ms).
pub const DATA_CHANNEL_TIMEOUT_MS: u64 = 10000;

/// Timeout for a reply on the data channel (ms).
pub const REPLY_TIMEOUT_MS: u64 = 5000;

/// Full offer/answer/candidate exchange between a TestClient and a session
/// fed directly through its command channel.
pub async fn perform_signaling(
    client: &TestClient,
    session_tx: &mpsc::Sender<SessionCommand>,
    signal_rx: &mut mpsc::UnboundedReceiver<CapturedSignal>,
) -> Result<()> {
    let offer = client
        .create_offer()
        .await
        .context("Failed to create offer")?;

    session_tx
        .send(SessionCommand::Offer { sdp: offer })
        .await
        .context("Failed to send offer")?;

    let answer_sdp = wait_for_answer(signal_rx, SIGNAL_TIMEOUT_MS)
        .await
        .context("Failed to receive answer")?;

    client
        .set_remote_answer(answer_sdp)
        .await
        .context("Failed to set remote answer")?;

    for candidate in client.gather_ice_candidates(ICE_GATHERING_TIMEOUT_MS).await {
        session_tx
            .send(SessionCommand::RemoteCandidate { candidate })
            .await
            .context("Failed to send candidate")?;
    }

    apply_server_candidates(client, signal_rx, ICE_GATHERING_TIMEOUT_MS).await;
    Ok(())
}

/// Waits for the next answer, skipping anything else.
pub async fn wait_for_answer(
    signal_rx: &mut mpsc::UnboundedReceiver<CapturedSignal>,
    timeout_ms: u64,
) -> Result<String> {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match tokio::time::timeout(remaining, signal_rx.recv()).await {
            Ok(Some(CapturedSignal::Answer { sdp, .. })) => return Ok(sdp),
            Ok(Some(_)) => continue,
            Ok(None) => anyhow::bail!("Signal channel closed"),
            Err(_) => anyhow::bail!("Timeout waiting for answer"),
        }
    }
}

/// Feeds server candidates to the client until it reports connected or the
/// time runs out.
async fn apply_server_candidates(
    client: &TestClient,
    signal_rx: &mut mpsc::UnboundedReceiver<CapturedSignal>,
    timeout_ms: u64,
) {
    let deadline = Instant::now() + Duration::from_millis(timeout_ms);

    while Instant::now() < deadline && !client.is_connected().await {
        match tokio::time::timeout(Duration::from_millis(100), signal_rx.recv()).await {
            Ok(Some(CapturedSignal::Candidate { candidate, .. })) => {
                if let Err(e) = client.add_ice_candidate(candidate).await {
                    tracing::warn!("[SignalHelper] Failed to add ICE candidate: {}", e);
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(_) => continue,
        }
    }
}
