use huddle_core::{ClientMessage, ConnectionId, ServerMessage};
use serde_json::json;
use tokio::sync::mpsc;

use huddle_server::{RelayConfig, RelayService, RouteOutcome};

use crate::integration::init_tracing;

#[tokio::test]
async fn test_signal_reaches_only_target() {
    init_tracing();

    let service = RelayService::new(&RelayConfig::default());
    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    let (tx_x, mut rx_x) = mpsc::unbounded_channel();
    let (tx_y, mut rx_y) = mpsc::unbounded_channel();

    let a = service.on_connect(tx_a);
    let x = service.on_connect(tx_x);
    let _y = service.on_connect(tx_y);

    // Drain greetings.
    while rx_x.try_recv().is_ok() {}
    while rx_y.try_recv().is_ok() {}

    let payload = json!({ "type": "offer", "sdp": "v=0" });
    let outcome = service
        .handle_message(
            a,
            ClientMessage::Signal {
                to: x,
                signal: payload.clone(),
            },
        )
        .await;

    assert_eq!(outcome, RouteOutcome::Delivered);
    assert_eq!(
        rx_x.try_recv().unwrap(),
        ServerMessage::Signal {
            from: a,
            signal: payload
        }
    );
    assert!(rx_y.try_recv().is_err());
}

#[tokio::test]
async fn test_signal_to_unknown_target_is_dropped() {
    init_tracing();

    let service = RelayService::new(&RelayConfig::default());
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let a = service.on_connect(tx_a);
    while rx_a.try_recv().is_ok() {}

    let outcome = service
        .handle_message(
            a,
            ClientMessage::Signal {
                to: ConnectionId::new(),
                signal: json!({ "candidate": "candidate:1" }),
            },
        )
        .await;

    assert_eq!(outcome, RouteOutcome::Dropped);
    assert!(rx_a.try_recv().is_err(), "the sender is never told about drops");
}

#[tokio::test]
async fn test_signal_to_departed_target_is_dropped() {
    init_tracing();

    let service = RelayService::new(&RelayConfig::default());
    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    let (tx_x, _rx_x) = mpsc::unbounded_channel();
    let a = service.on_connect(tx_a);
    let x = service.on_connect(tx_x);

    service.on_disconnect(&x).await;

    let outcome = service
        .handle_message(
            a,
            ClientMessage::Signal {
                to: x,
                signal: json!({ "type": "answer", "sdp": "v=0" }),
            },
        )
        .await;
    assert_eq!(outcome, RouteOutcome::Dropped);
}

#[tokio::test]
async fn test_signal_payload_is_not_validated() {
    init_tracing();

    let service = RelayService::new(&RelayConfig::default());
    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    let (tx_x, mut rx_x) = mpsc::unbounded_channel();
    let a = service.on_connect(tx_a);
    let x = service.on_connect(tx_x);
    while rx_x.try_recv().is_ok() {}

    let odd = json!(["not", "a", "signal"]);
    let outcome = service
        .handle_message(
            a,
            ClientMessage::Signal {
                to: x,
                signal: odd.clone(),
            },
        )
        .await;

    assert_eq!(outcome, RouteOutcome::Delivered);
    assert_eq!(
        rx_x.try_recv().unwrap(),
        ServerMessage::Signal {
            from: a,
            signal: odd
        }
    );
}
