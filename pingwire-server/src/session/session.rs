use crate::session::channel_behavior::ChannelBehavior;
use crate::session::context::ChannelContext;
use crate::session::session_command::SessionCommand;
use crate::session::session_status::{SessionPhase, SessionStatus};
use crate::signaling::SignalingOutput;
use crate::transport::{ConnectionWrapper, TransportConfig, TransportEvent};
use pingwire_core::{CandidatePayload, ConnectionId};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};
use webrtc::data_channel::RTCDataChannel;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;

/// Negotiation and data-channel state for one signaling connection.
///
/// The session owns its peer connection and is driven by a single task
/// ([`Session::run`]). Signaling commands and engine events both arrive as
/// messages, so nothing here is shared across threads.
pub struct Session {
    connection_id: ConnectionId,
    behavior: Box<dyn ChannelBehavior>,
    transport: Option<ConnectionWrapper>,
    active_channel: Option<Arc<RTCDataChannel>>,
    generation: u64,
    command_rx: mpsc::Receiver<SessionCommand>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    transport_tx: mpsc::Sender<TransportEvent>,
    signaling: Arc<dyn SignalingOutput>,
    transport_config: TransportConfig,
    status_tx: watch::Sender<SessionStatus>,
}

impl Session {
    pub fn new(
        connection_id: ConnectionId,
        behavior: Box<dyn ChannelBehavior>,
        command_rx: mpsc::Receiver<SessionCommand>,
        signaling: Arc<dyn SignalingOutput>,
        transport_config: TransportConfig,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::channel(256);
        let (status_tx, _) = watch::channel(SessionStatus::default());

        Self {
            connection_id,
            behavior,
            transport: None,
            active_channel: None,
            generation: 0,
            command_rx,
            transport_rx,
            transport_tx,
            signaling,
            transport_config,
            status_tx,
        }
    }

    /// Status updates for this session. Keeps working after `run` consumes it.
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    pub async fn run(mut self) {
        info!("Session {} started", self.connection_id);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    let Some(cmd) = cmd else {
                        info!("Command channel for {} closed", self.connection_id);
                        self.shutdown().await;
                        break;
                    };
                    if self.handle_command(cmd).await.is_break() {
                        break;
                    }
                }

                Some(evt) = self.transport_rx.recv() => {
                    self.handle_transport_event(evt).await;
                }
            }
        }

        info!("Session {} finished", self.connection_id);
    }

    async fn handle_command(&mut self, cmd: SessionCommand) -> ControlFlow<()> {
        match cmd {
            SessionCommand::Offer { sdp } => self.handle_offer(sdp).await,
            SessionCommand::RemoteCandidate { candidate } => {
                self.handle_remote_candidate(candidate).await
            }
            SessionCommand::Disconnect => {
                self.shutdown().await;
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    async fn handle_offer(&mut self, sdp: String) {
        info!("Processing offer from {}", self.connection_id);

        if self.transport.is_some() {
            info!("Replacing existing peer connection for {}", self.connection_id);
            self.drop_transport().await;
        }

        self.generation += 1;
        self.update_status(|status| {
            status.phase = SessionPhase::Negotiating;
            status.remote_candidates = 0;
            status.local_candidates = 0;
        });

        let transport = match ConnectionWrapper::new(
            self.connection_id.clone(),
            self.generation,
            &self.transport_config,
            self.transport_tx.clone(),
        )
        .await
        {
            Ok(transport) => transport,
            Err(e) => {
                error!(
                    "Failed to create peer connection for {}: {:?}",
                    self.connection_id, e
                );
                self.set_phase(SessionPhase::Idle);
                return;
            }
        };

        if let Err(e) = transport.set_remote_offer(sdp).await {
            error!("SDP error for {}: {:?}", self.connection_id, e);
            let _ = transport.close().await;
            self.set_phase(SessionPhase::Idle);
            return;
        }

        match transport.create_answer().await {
            Ok(answer_sdp) => {
                self.transport = Some(transport);
                self.signaling
                    .send_answer(self.connection_id.clone(), answer_sdp)
                    .await;
                self.update_status(|status| status.answers_sent += 1);
            }
            Err(e) => {
                error!(
                    "Failed to create answer for {}: {:?}",
                    self.connection_id, e
                );
                let _ = transport.close().await;
                self.set_phase(SessionPhase::Idle);
            }
        }
    }

    async fn handle_remote_candidate(&mut self, candidate: CandidatePayload) {
        let Some(transport) = &self.transport else {
            warn!(
                "Candidate from {} arrived before any offer, dropping it",
                self.connection_id
            );
            return;
        };

        debug!(
            "Remote candidate for {}: {} (sdpMid {:?}, sdpMLineIndex {:?})",
            self.connection_id, candidate.candidate, candidate.sdp_mid, candidate.sdp_mline_index
        );

        match transport.add_ice_candidate(candidate).await {
            Ok(()) => self.update_status(|status| status.remote_candidates += 1),
            Err(e) => warn!(
                "Failed to add ICE candidate for {}: {:?}",
                self.connection_id, e
            ),
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        if event.generation() != self.generation {
            debug!(
                "Ignoring event from replaced peer connection {} of {}",
                event.generation(),
                self.connection_id
            );
            return;
        }

        match event {
            TransportEvent::CandidateGenerated(_, candidate) => {
                self.signaling
                    .send_candidate(self.connection_id.clone(), candidate)
                    .await;
                self.update_status(|status| status.local_candidates += 1);
            }

            TransportEvent::StateChanged(_, state) => match state {
                RTCPeerConnectionState::Connected => {
                    if self.status_tx.borrow().phase == SessionPhase::Negotiating {
                        self.set_phase(SessionPhase::Connected);
                    }
                }
                RTCPeerConnectionState::Failed
                | RTCPeerConnectionState::Disconnected
                | RTCPeerConnectionState::Closed => {
                    warn!("Peer connection for {} is {}", self.connection_id, state);
                }
                _ => {}
            },

            TransportEvent::DataChannelReady(_, channel) => {
                info!(
                    "Data channel '{}' open for {}",
                    channel.label(),
                    self.connection_id
                );
                let ctx = ChannelContext::new(self.connection_id.clone(), channel.clone());
                self.active_channel = Some(channel);
                self.set_phase(SessionPhase::Ready);
                self.behavior.on_open(&ctx).await;
            }

            TransportEvent::Message(_, channel, data) => {
                if !self.is_active(&channel) {
                    debug!(
                        "Dropping message on inactive channel '{}' of {}",
                        channel.label(),
                        self.connection_id
                    );
                    return;
                }
                let ctx = ChannelContext::new(self.connection_id.clone(), channel);
                self.behavior.on_message(&ctx, data).await;
            }

            TransportEvent::DataChannelClosed(_, channel) => {
                if !self.is_active(&channel) {
                    return;
                }
                info!(
                    "Data channel '{}' closed for {}",
                    channel.label(),
                    self.connection_id
                );
                self.active_channel = None;
                let ctx = ChannelContext::new(self.connection_id.clone(), channel);
                self.behavior.on_close(&ctx).await;
            }
        }
    }

    fn is_active(&self, channel: &Arc<RTCDataChannel>) -> bool {
        self.active_channel
            .as_ref()
            .is_some_and(|active| Arc::ptr_eq(active, channel))
    }

    async fn drop_transport(&mut self) {
        self.active_channel = None;

        let Some(transport) = self.transport.take() else {
            return;
        };
        if let Err(e) = transport.close().await {
            warn!(
                "Failed to close peer connection for {}: {:?}",
                self.connection_id, e
            );
        }
    }

    async fn shutdown(&mut self) {
        self.drop_transport().await;
        self.set_phase(SessionPhase::Closed);
    }

    fn set_phase(&self, phase: SessionPhase) {
        self.update_status(|status| {
            if status.phase != phase {
                debug!("Session {}: {} -> {}", self.connection_id, status.phase, phase);
                status.phase = phase;
            }
        });
    }

    fn update_status(&self, update: impl FnOnce(&mut SessionStatus)) {
        self.status_tx.send_modify(update);
    }
}
