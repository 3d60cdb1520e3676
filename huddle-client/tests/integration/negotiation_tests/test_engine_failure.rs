use huddle_client::SessionState;
use huddle_core::{ConnectionId, Signal};
use serde_json::json;

use crate::integration::{Harness, eventually};
use crate::utils::{EngineCall, Fault};

#[tokio::test]
async fn test_failed_offer_stalls_session() {
    let mut h = Harness::new();
    h.factory.inject(Fault::FailOffer);
    let bob = ConnectionId::new();

    h.manager.on_peer_joined(bob, "bob".to_string());

    let engine = h.factory.wait_for_engine(&bob).await;
    assert!(eventually(|| engine.calls() == vec![EngineCall::CreateOffer]).await);
    h.expect_no_signal(150).await;
    assert_eq!(h.manager.state(&bob), Some(SessionState::New));

    // A stalled session still answers to being closed.
    h.manager.on_peer_left(bob).await;
    assert!(engine.is_closed());
    assert_eq!(h.manager.state(&bob), None);
}

#[tokio::test]
async fn test_failure_is_isolated_to_one_peer() {
    let mut h = Harness::new();
    let carol = ConnectionId::new();
    let dave = ConnectionId::new();

    h.factory.inject(Fault::FailOffer);
    h.manager.on_peer_joined(carol, "carol".to_string());
    h.factory.wait_for_engine(&carol).await;

    // Offers fail for every engine now, but answering still works.
    h.manager.on_signal(
        dave,
        Signal::Offer {
            sdp: "v=0".to_string(),
        }
        .to_value()
        .unwrap(),
    );

    let (to, signal) = h.next_signal().await;
    assert_eq!(to, dave);
    assert!(matches!(signal, Signal::Answer { .. }));
    assert_eq!(h.manager.state(&carol), Some(SessionState::New));
}

#[tokio::test]
async fn test_undecodable_signal_is_dropped() {
    let mut h = Harness::new();
    let alice = ConnectionId::new();

    h.manager
        .on_signal(alice, json!({ "type": "pranswer", "sdp": "v=0" }));
    h.manager.on_signal(alice, json!({ "type": "offer" }));
    h.manager.on_signal(alice, json!("not an object"));

    h.expect_no_signal(100).await;
    assert_eq!(h.factory.created(), 0);
}
