use crate::session::SessionCommand;
use anyhow::{Context, Result};
use pingwire_core::{ConnectionId, SignalError, SignalMessage};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// What the router did with one inbound text frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Forwarded,
    Ignored,
}

/// Decodes one signaling text frame and forwards it to the session.
///
/// Bad input is logged and ignored so the connection stays open. The only
/// error is a session that no longer accepts commands.
pub async fn route_message(
    connection_id: &ConnectionId,
    text: &str,
    session_tx: &mpsc::Sender<SessionCommand>,
) -> Result<RouteOutcome> {
    let msg = match SignalMessage::decode(text) {
        Ok(msg) => msg,
        Err(SignalError::UnrecognizedType(message_type)) => {
            warn!(
                "Unrecognized message type '{}' from {}",
                message_type, connection_id
            );
            return Ok(RouteOutcome::Ignored);
        }
        Err(e) => {
            warn!("Invalid signaling message from {}: {}", connection_id, e);
            return Ok(RouteOutcome::Ignored);
        }
    };

    let cmd = match msg {
        SignalMessage::Offer(offer) => {
            debug!("Offer from {} ({} bytes of SDP)", connection_id, offer.sdp.len());
            SessionCommand::Offer { sdp: offer.sdp }
        }
        SignalMessage::Candidate(candidate) => SessionCommand::RemoteCandidate { candidate },
        SignalMessage::Answer(_) => {
            warn!(
                "Unrecognized message type 'answer' from {}: the server only answers",
                connection_id
            );
            return Ok(RouteOutcome::Ignored);
        }
    };

    session_tx
        .send(cmd)
        .await
        .with_context(|| format!("Session for {} is gone", connection_id))?;
    Ok(RouteOutcome::Forwarded)
}
