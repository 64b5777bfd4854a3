use crate::config::ServerConfig;
use crate::session::{ChannelBehavior, PongResponder, SessionManager};
use crate::signaling::{SignalingService, ws_handler};
use crate::transport::TransportConfig;
use anyhow::{Context, Result};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Shared state handed to the WebSocket handler.
#[derive(Clone)]
pub struct ServerState {
    pub signaling: SignalingService,
    pub sessions: SessionManager,
}

impl ServerState {
    /// State whose sessions answer every data-channel message with `PONG`.
    pub fn new(transport: TransportConfig) -> Self {
        Self::with_behavior(transport, || Box::new(PongResponder))
    }

    pub fn with_behavior<F>(transport: TransportConfig, behavior_factory: F) -> Self
    where
        F: Fn() -> Box<dyn ChannelBehavior> + Send + Sync + 'static,
    {
        let signaling = SignalingService::new();
        let sessions =
            SessionManager::new(behavior_factory, Arc::new(signaling.clone()), transport);

        Self {
            signaling,
            sessions,
        }
    }
}

/// The WebSocket endpoint lives at `/`.
pub fn router(state: ServerState) -> Router {
    Router::new().route("/", get(ws_handler)).with_state(state)
}

/// Binds `config.bind_addr` and serves until Ctrl+C.
pub async fn serve(config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    serve_with_shutdown(listener, ServerState::new(config.transport), shutdown_signal()).await
}

pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: ServerState,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!("Signaling server listening on ws://{}/", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("Signaling server stopped")?;

    info!("Signaling server on {} shut down", addr);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Ctrl+C received, shutting down");
}
