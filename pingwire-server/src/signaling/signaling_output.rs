use async_trait::async_trait;
use pingwire_core::{CandidatePayload, ConnectionId};

/// Outbound half of signaling, used by sessions to reach their client.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Send the SDP answer to the client on `connection_id`.
    async fn send_answer(&self, connection_id: ConnectionId, sdp: String);

    /// Trickle one local ICE candidate to the client on `connection_id`.
    async fn send_candidate(&self, connection_id: ConnectionId, candidate: CandidatePayload);
}
