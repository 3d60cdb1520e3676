use huddle_core::{ClientMessage, ServerMessage};
use serde_json::json;
use tokio::sync::mpsc;

use huddle_server::{RelayConfig, RelayService};

use crate::integration::init_tracing;

#[tokio::test]
async fn test_rapid_signal_sending_preserves_order() {
    init_tracing();

    let service = RelayService::new(&RelayConfig::default());
    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let a = service.on_connect(tx_a);
    let b = service.on_connect(tx_b);
    while rx_b.try_recv().is_ok() {}

    const COUNT: usize = 200;
    for i in 0..COUNT {
        let msg = ClientMessage::Signal {
            to: b,
            signal: json!({ "candidate": format!("candidate:{i}") }),
        };
        service.handle_message(a, msg).await;
    }

    for i in 0..COUNT {
        match rx_b.recv().await {
            Some(ServerMessage::Signal { from, signal }) => {
                assert_eq!(from, a);
                assert_eq!(signal["candidate"], format!("candidate:{i}"));
            }
            other => panic!("unexpected frame {other:?}"),
        }
    }
}
