use huddle_core::ServerMessage;
use tokio::sync::mpsc;

use huddle_server::{RelayConfig, RelayService};

use crate::integration::init_tracing;

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    init_tracing();

    let service = RelayService::new(&RelayConfig::default());
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, _rx_b) = mpsc::unbounded_channel();

    let a = service.on_connect(tx_a);
    let b = service.on_connect(tx_b);

    assert_eq!(rx_a.recv().await, Some(ServerMessage::Welcome { id: a }));
    assert!(matches!(rx_a.recv().await, Some(ServerMessage::IceConfig { .. })));

    service
        .handle_message(a, huddle_core::ClientMessage::join("r1", "alice"))
        .await;
    service
        .handle_message(b, huddle_core::ClientMessage::join("r1", "bob"))
        .await;

    assert!(matches!(
        rx_a.recv().await,
        Some(ServerMessage::PeerJoined { id, .. }) if id == b
    ));

    service.on_disconnect(&b).await;
    service.on_disconnect(&b).await;
    service.on_disconnect(&huddle_core::ConnectionId::new()).await;

    assert_eq!(rx_a.recv().await, Some(ServerMessage::PeerLeft { id: b }));
    assert_eq!(service.directory().members("r1").await, vec![a]);
    assert!(rx_a.try_recv().is_err(), "second disconnect must not re-announce");
    assert!(!service.registry().is_connected(&b));
    assert!(service.registry().is_connected(&a));
}
