//! Conversions between the wire model and the `webrtc` engine types.

use crate::model::ice::IceServerConfig;
use crate::model::signaling::CandidatePayload;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::ice_transport::ice_server::RTCIceServer;

impl From<&IceServerConfig> for RTCIceServer {
    fn from(config: &IceServerConfig) -> Self {
        RTCIceServer {
            urls: config.urls.clone(),
            username: config.username.clone().unwrap_or_default(),
            credential: config.credential.clone().unwrap_or_default(),
            ..Default::default()
        }
    }
}

impl From<CandidatePayload> for RTCIceCandidateInit {
    fn from(payload: CandidatePayload) -> Self {
        RTCIceCandidateInit {
            candidate: payload.candidate,
            sdp_mid: payload.sdp_mid,
            sdp_mline_index: payload.sdp_mline_index,
            username_fragment: payload.username_fragment,
        }
    }
}

impl From<RTCIceCandidateInit> for CandidatePayload {
    fn from(init: RTCIceCandidateInit) -> Self {
        CandidatePayload {
            candidate: init.candidate,
            sdp_mid: init.sdp_mid,
            sdp_mline_index: init.sdp_mline_index,
            username_fragment: init.username_fragment,
        }
    }
}

/// Engine-side ICE server list for a peer connection configuration.
pub fn rtc_ice_servers(servers: &[IceServerConfig]) -> Vec<RTCIceServer> {
    servers.iter().map(RTCIceServer::from).collect()
}
