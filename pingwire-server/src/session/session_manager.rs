use crate::session::{ChannelBehavior, Session, SessionCommand, SessionStatus};
use crate::signaling::SignalingOutput;
use crate::transport::TransportConfig;
use dashmap::DashMap;
use pingwire_core::ConnectionId;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// Sender side of a running [`Session`].
#[derive(Clone)]
pub struct SessionHandle {
    command_tx: mpsc::Sender<SessionCommand>,
    status_rx: watch::Receiver<SessionStatus>,
}

impl SessionHandle {
    pub fn commands(&self) -> &mpsc::Sender<SessionCommand> {
        &self.command_tx
    }

    pub fn status(&self) -> SessionStatus {
        self.status_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_rx.clone()
    }
}

/// Spawns one [`Session`] per signaling connection and keeps their handles.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<DashMap<ConnectionId, SessionHandle>>,
    behavior_factory: Arc<dyn Fn() -> Box<dyn ChannelBehavior> + Send + Sync>,
    signaling: Arc<dyn SignalingOutput>,
    transport_config: TransportConfig,
}

impl SessionManager {
    pub fn new<F>(
        behavior_factory: F,
        signaling: Arc<dyn SignalingOutput>,
        transport_config: TransportConfig,
    ) -> Self
    where
        F: Fn() -> Box<dyn ChannelBehavior> + Send + Sync + 'static,
    {
        Self {
            sessions: Arc::new(DashMap::new()),
            behavior_factory: Arc::new(behavior_factory),
            signaling,
            transport_config,
        }
    }

    pub fn open_session(&self, connection_id: ConnectionId) -> SessionHandle {
        if let Some(handle) = self.sessions.get(&connection_id) {
            return handle.value().clone();
        }

        info!("Opening session {}", connection_id);
        let (command_tx, command_rx) = mpsc::channel(100);
        let behavior = (self.behavior_factory)();

        let session = Session::new(
            connection_id.clone(),
            behavior,
            command_rx,
            self.signaling.clone(),
            self.transport_config.clone(),
        );
        let handle = SessionHandle {
            command_tx,
            status_rx: session.subscribe(),
        };
        tokio::spawn(session.run());

        self.sessions.insert(connection_id, handle.clone());
        handle
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<SessionHandle> {
        self.sessions.get(connection_id).map(|entry| entry.value().clone())
    }

    /// Stops the session and forgets it. Its peer connection is closed.
    pub async fn close_session(&self, connection_id: &ConnectionId) {
        let Some((_, handle)) = self.sessions.remove(connection_id) else {
            return;
        };
        if handle.command_tx.send(SessionCommand::Disconnect).await.is_err() {
            warn!("Session {} already stopped", connection_id);
        }
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
