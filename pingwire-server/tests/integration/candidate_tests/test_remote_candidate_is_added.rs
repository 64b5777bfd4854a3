use pingwire_core::CandidatePayload;
use pingwire_server::SessionCommand;

use crate::integration::{create_test_session, init_tracing, wait_for_status};
use crate::utils::{SIGNAL_TIMEOUT_MS, TestClient, TestClientConfig, wait_for_answer};

fn host_candidate(port: u16) -> CandidatePayload {
    CandidatePayload {
        candidate: format!("candidate:1 1 udp 2130706431 192.0.2.1 {} typ host", port),
        sdp_mid: Some("0".to_owned()),
        sdp_mline_index: Some(0),
        username_fragment: None,
    }
}

#[tokio::test]
async fn test_remote_candidate_is_added() {
    init_tracing();

    let mut session = create_test_session();
    let client = TestClient::new(TestClientConfig::default())
        .await
        .expect("Failed to create test client");

    let offer = client.create_offer().await.expect("Failed to create offer");
    session
        .commands
        .send(SessionCommand::Offer { sdp: offer })
        .await
        .expect("Session is gone");
    wait_for_answer(&mut session.signals, SIGNAL_TIMEOUT_MS)
        .await
        .expect("No answer");

    session
        .commands
        .send(SessionCommand::RemoteCandidate {
            candidate: host_candidate(50000),
        })
        .await
        .expect("Session is gone");
    assert!(wait_for_status(&mut session.status, 2000, |s| s.remote_candidates == 1).await);

    // A candidate the engine cannot parse is logged and not counted.
    session
        .commands
        .send(SessionCommand::RemoteCandidate {
            candidate: CandidatePayload {
                candidate: "candidate:garbage".to_owned(),
                sdp_mid: Some("0".to_owned()),
                sdp_mline_index: Some(0),
                username_fragment: None,
            },
        })
        .await
        .expect("Session is gone");

    session
        .commands
        .send(SessionCommand::RemoteCandidate {
            candidate: host_candidate(50001),
        })
        .await
        .expect("Session died after a bad candidate");
    assert!(wait_for_status(&mut session.status, 2000, |s| s.remote_candidates == 2).await);
    assert_eq!(session.status.borrow().remote_candidates, 2);

    client.close().await.expect("Failed to close client");
}
