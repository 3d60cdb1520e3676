pub mod connection_tests;
pub mod multi_peer_tests;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::Level;

use huddle_server::{RelayConfig, RelayService, RoomDirectory, build_router};

use crate::utils::MockSignalingOutput;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A directory whose broadcasts are captured instead of sent.
pub fn create_test_directory() -> (RoomDirectory, MockSignalingOutput) {
    let signaling = MockSignalingOutput::new();
    let directory = RoomDirectory::new(Arc::new(signaling.clone()), 100);
    (directory, signaling)
}

/// Starts a relay on an ephemeral port and returns its WebSocket url.
pub async fn spawn_relay() -> (String, RelayService) {
    let config = RelayConfig::default();
    let service = RelayService::new(&config);
    let app = build_router(service.clone(), None);

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local addr");

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("ws://{addr}/ws"), service)
}
