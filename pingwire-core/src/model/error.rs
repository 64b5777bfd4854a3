use thiserror::Error;

/// Reasons an inbound signaling text could not be turned into a [`SignalMessage`].
///
/// [`SignalMessage`]: crate::SignalMessage
#[derive(Debug, Error)]
pub enum SignalError {
    #[error("malformed signaling message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unrecognized message type '{0}'")]
    UnrecognizedType(String),

    #[error("invalid '{message_type}' payload: {source}")]
    InvalidPayload {
        message_type: String,
        #[source]
        source: serde_json::Error,
    },
}
