use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use pingwire_core::{CandidatePayload, ConnectionId, SessionDescriptionPayload, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

struct SignalingInner {
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
}

/// Registry of open WebSocket connections, keyed by [`ConnectionId`].
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                connections: DashMap::new(),
            }),
        }
    }

    pub fn add_connection(
        &self,
        connection_id: ConnectionId,
        tx: mpsc::UnboundedSender<Message>,
    ) {
        self.inner.connections.insert(connection_id, tx);
    }

    pub fn remove_connection(&self, connection_id: &ConnectionId) {
        self.inner.connections.remove(connection_id);
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.len()
    }

    pub fn send_signal(&self, connection_id: &ConnectionId, msg: SignalMessage) {
        let Some(connection) = self.inner.connections.get(connection_id) else {
            warn!(
                "Attempted to send {} to closed connection {}",
                msg.message_type(),
                connection_id
            );
            return;
        };

        match msg.encode() {
            Ok(json) => {
                debug!("Sending {} to {}", msg.message_type(), connection_id);
                if let Err(e) = connection.send(Message::Text(json.into())) {
                    error!("Failed to send WS message to {}: {:?}", connection_id, e);
                }
            }
            Err(e) => error!("Failed to serialize signal message: {}", e),
        }
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send_answer(&self, connection_id: ConnectionId, sdp: String) {
        let msg = SignalMessage::Answer(SessionDescriptionPayload::answer(sdp));
        self.send_signal(&connection_id, msg);
    }

    async fn send_candidate(&self, connection_id: ConnectionId, candidate: CandidatePayload) {
        self.send_signal(&connection_id, SignalMessage::Candidate(candidate));
    }
}
