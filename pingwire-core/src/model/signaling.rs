use crate::model::error::SignalError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `{type, sdp}` body of offer and answer messages.
///
/// Clients are allowed to omit `type` on offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptionPayload {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub sdp: String,
}

impl SessionDescriptionPayload {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            kind: Some("offer".to_owned()),
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            kind: Some("answer".to_owned()),
            sdp: sdp.into(),
        }
    }
}

/// Body of a `candidate` message. Field names follow the browser's
/// `RTCIceCandidateInit` so a client can forward its candidates untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidatePayload {
    pub candidate: String,
    #[serde(rename = "sdpMid", default)]
    pub sdp_mid: Option<String>,
    #[serde(rename = "sdpMLineIndex", default)]
    pub sdp_mline_index: Option<u16>,
    #[serde(
        rename = "usernameFragment",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub username_fragment: Option<String>,
}

/// A signaling message as it travels over the WebSocket:
/// `{"messageType": "...", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "messageType", content = "payload", rename_all = "lowercase")]
pub enum SignalMessage {
    Offer(SessionDescriptionPayload),
    Answer(SessionDescriptionPayload),
    Candidate(CandidatePayload),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "messageType")]
    message_type: String,
    #[serde(default)]
    payload: Value,
}

impl SignalMessage {
    /// Decodes one text frame.
    ///
    /// The envelope is read first so that an unknown `messageType` is told
    /// apart from a known type carrying a broken payload.
    pub fn decode(text: &str) -> Result<Self, SignalError> {
        let envelope: Envelope = serde_json::from_str(text)?;

        let invalid = |source| SignalError::InvalidPayload {
            message_type: envelope.message_type.clone(),
            source,
        };

        match envelope.message_type.as_str() {
            "offer" => serde_json::from_value(envelope.payload.clone())
                .map(SignalMessage::Offer)
                .map_err(invalid),
            "answer" => serde_json::from_value(envelope.payload.clone())
                .map(SignalMessage::Answer)
                .map_err(invalid),
            "candidate" => serde_json::from_value(envelope.payload.clone())
                .map(SignalMessage::Candidate)
                .map_err(invalid),
            other => Err(SignalError::UnrecognizedType(other.to_owned())),
        }
    }

    pub fn encode(&self) -> Result<String, SignalError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn message_type(&self) -> &'static str {
        match self {
            SignalMessage::Offer(_) => "offer",
            SignalMessage::Answer(_) => "answer",
            SignalMessage::Candidate(_) => "candidate",
        }
    }
}
