use crate::server::ServerState;
use crate::signaling::route_message;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use pingwire_core::ConnectionId;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<ServerState>,
) -> impl IntoResponse {
    let connection_id = ConnectionId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, connection_id, state))
}

async fn handle_socket(socket: WebSocket, connection_id: ConnectionId, state: ServerState) {
    info!("New WebSocket connection: {}", connection_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.signaling.add_connection(connection_id.clone(), tx);
    let session = state.sessions.open_session(connection_id.clone());

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let connection_id = connection_id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => {
                        if let Err(e) =
                            route_message(&connection_id, text.as_str(), session.commands()).await
                        {
                            error!("{:?}", e);
                            break;
                        }
                    }
                    Message::Binary(data) => {
                        debug!(
                            "Ignoring {} byte binary frame from {}",
                            data.len(),
                            connection_id
                        );
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.sessions.close_session(&connection_id).await;
    state.signaling.remove_connection(&connection_id);
    info!("WebSocket disconnected: {}", connection_id);
}
