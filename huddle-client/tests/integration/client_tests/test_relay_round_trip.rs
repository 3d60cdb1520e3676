use std::time::Duration;

use huddle_client::{ClientConfig, ClientError, ClientEvent, SignalingClient};
use huddle_core::{ConnectionId, SdpKind};
use tokio::sync::{mpsc, oneshot};

use crate::integration::{WAIT_MS, eventually, init_tracing, spawn_relay};
use crate::utils::{EngineCall, MockEngineFactory, MockTrack};

type Events = mpsc::UnboundedReceiver<ClientEvent<MockTrack>>;

async fn next_event(events: &mut Events) -> ClientEvent<MockTrack> {
    tokio::time::timeout(Duration::from_millis(WAIT_MS), events.recv())
        .await
        .expect("Timed out waiting for a client event")
        .expect("Event channel closed")
}

async fn expect_welcome(events: &mut Events) -> ConnectionId {
    match next_event(events).await {
        ClientEvent::Welcome { id } => id,
        other => panic!("Expected Welcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_two_clients_negotiate_through_relay() {
    init_tracing();
    let (url, service) = spawn_relay().await;

    let factory_a = MockEngineFactory::new();
    let (alice, mut alice_events) =
        SignalingClient::connect(ClientConfig::new(&url, "lobby", "alice"), factory_a.clone())
            .await
            .unwrap();
    let (stop_alice, stop_alice_rx) = oneshot::channel::<()>();
    let alice_task = tokio::spawn(alice.run_until(async move {
        let _ = stop_alice_rx.await;
    }));
    let alice_id = expect_welcome(&mut alice_events).await;

    let directory = service.directory().clone();
    let mut joined = false;
    for _ in 0..200 {
        if directory.members("lobby").await == vec![alice_id] {
            joined = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(joined, "alice never joined the room");

    let factory_b = MockEngineFactory::new();
    let (bob, mut bob_events) =
        SignalingClient::connect(ClientConfig::new(&url, "lobby", "bob"), factory_b.clone())
            .await
            .unwrap();
    let bob_task = tokio::spawn(bob.run());
    let bob_id = expect_welcome(&mut bob_events).await;

    match next_event(&mut alice_events).await {
        ClientEvent::PeerJoined { id, username } => {
            assert_eq!(id, bob_id);
            assert_eq!(username, "bob");
        }
        other => panic!("Expected PeerJoined, got {other:?}"),
    }

    // alice offers, bob answers, alice applies the answer.
    let alice_side = factory_a.wait_for_engine(&bob_id).await;
    assert!(
        eventually(|| alice_side
            .calls()
            .contains(&EngineCall::SetRemote(SdpKind::Answer)))
        .await
    );
    let bob_side = factory_b.wait_for_engine(&alice_id).await;
    assert_eq!(
        bob_side.calls(),
        vec![
            EngineCall::SetRemote(SdpKind::Offer),
            EngineCall::CreateAnswer,
            EngineCall::SetLocal(SdpKind::Answer),
        ]
    );

    // alice leaving closes her sessions and tears bob's down via peer-left.
    stop_alice.send(()).unwrap();
    alice_task.await.unwrap().unwrap();
    assert!(alice_side.is_closed());
    assert!(eventually(|| bob_side.is_closed()).await);

    bob_task.abort();
}

#[tokio::test]
async fn test_connect_rejects_missing_username() {
    init_tracing();
    let config = ClientConfig::new("ws://127.0.0.1:9/ws", "lobby", "");

    let result = SignalingClient::connect(config, MockEngineFactory::new()).await;

    assert!(matches!(result, Err(ClientError::Usage("username"))));
}

#[tokio::test]
async fn test_connect_rejects_missing_room() {
    init_tracing();
    let config = ClientConfig::new("ws://127.0.0.1:9/ws", " ", "alice");

    let result = SignalingClient::connect(config, MockEngineFactory::new()).await;

    assert!(matches!(result, Err(ClientError::Usage("room"))));
}
