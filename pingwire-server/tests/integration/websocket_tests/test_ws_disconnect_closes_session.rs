use std::time::Duration;

use crate::integration::{init_tracing, start_test_server};
use crate::utils::WsSignalClient;

#[tokio::test]
async fn test_ws_disconnect_closes_session() {
    init_tracing();

    let (addr, state) = start_test_server().await;
    let ws = WsSignalClient::connect(addr)
        .await
        .expect("Failed to connect");

    let mut registered = false;
    for _ in 0..50 {
        if state.sessions.len() == 1 && state.signaling.connection_count() == 1 {
            registered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(registered, "connection should open a session");

    ws.close().await.expect("Failed to close socket");

    let mut cleaned_up = false;
    for _ in 0..100 {
        if state.sessions.is_empty() && state.signaling.connection_count() == 0 {
            cleaned_up = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(cleaned_up, "closing the socket should drop the session");
}
