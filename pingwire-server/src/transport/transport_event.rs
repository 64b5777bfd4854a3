use bytes::Bytes;
use pingwire_core::CandidatePayload;
use std::sync::Arc;
use webrtc::data_channel::RTCDataChannel;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// Events a peer connection posts back to its session loop.
///
/// Every variant carries the generation of the peer connection that produced
/// it, so events from a replaced connection can be told apart.
pub enum TransportEvent {
    /// Local ICE candidate ready to be trickled to the client.
    CandidateGenerated(u64, CandidatePayload),

    StateChanged(u64, RTCPeerConnectionState),

    /// A channel opened by the remote peer is open and writable.
    DataChannelReady(u64, Arc<RTCDataChannel>),

    DataChannelClosed(u64, Arc<RTCDataChannel>),

    Message(u64, Arc<RTCDataChannel>, Bytes),
}

impl TransportEvent {
    pub fn generation(&self) -> u64 {
        match self {
            TransportEvent::CandidateGenerated(generation, _)
            | TransportEvent::StateChanged(generation, _)
            | TransportEvent::DataChannelReady(generation, _)
            | TransportEvent::DataChannelClosed(generation, _)
            | TransportEvent::Message(generation, _, _) => *generation,
        }
    }
}
