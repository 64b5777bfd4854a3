use pingwire_core::CandidatePayload;

/// Commands the signaling side posts into a session loop.
#[derive(Debug)]
pub enum SessionCommand {
    /// The client sent an SDP offer; build a fresh peer connection and answer it.
    Offer { sdp: String },

    /// Trickled ICE candidate from the client.
    RemoteCandidate { candidate: CandidatePayload },

    /// The WebSocket is gone.
    Disconnect,
}
