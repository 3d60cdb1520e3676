use huddle_core::ConnectionId;

use crate::integration::{create_test_directory, init_tracing};

#[tokio::test]
async fn test_rejoin_is_idempotent() {
    init_tracing();

    let (directory, signaling) = create_test_directory();
    let alice = ConnectionId::new();
    let bob = ConnectionId::new();

    directory.join("r1".into(), alice, "alice".into()).await;
    directory.join("r1".into(), bob, "bob".into()).await;
    directory.join("r1".into(), bob, "bob".into()).await;

    assert_eq!(directory.members("r1").await.len(), 2);
    assert_eq!(
        signaling.delivered_to(&alice).await.len(),
        1,
        "re-join must not announce bob twice"
    );
    assert_eq!(directory.rooms_of(&bob).len(), 1);
}
