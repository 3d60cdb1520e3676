use huddle_core::ConnectionId;
use std::collections::HashSet;

use crate::integration::{create_test_directory, init_tracing};

#[tokio::test]
async fn test_member_set_tracks_joins_and_leaves() {
    init_tracing();

    let (directory, _signaling) = create_test_directory();
    let ids: Vec<ConnectionId> = (0..6).map(|_| ConnectionId::new()).collect();
    let mut expected = HashSet::new();

    // Interleave joins and leaves; the room must always report exactly the
    // connections that joined and have not left yet.
    for (step, id) in ids.iter().enumerate() {
        directory.join("r".into(), *id, format!("user-{step}")).await;
        expected.insert(*id);

        if step % 2 == 1 {
            let gone = ids[step - 1];
            directory.leave(&gone).await;
            expected.remove(&gone);
        }

        let members: HashSet<ConnectionId> = directory.members("r").await.into_iter().collect();
        assert_eq!(members, expected, "after step {step}");
    }

    assert!(directory.members("never-joined").await.is_empty());
}

#[tokio::test]
async fn test_leave_without_membership_is_a_no_op() {
    init_tracing();

    let (directory, signaling) = create_test_directory();
    let member = ConnectionId::new();
    directory.join("r".into(), member, "m".into()).await;

    assert_eq!(directory.leave(&ConnectionId::new()).await, 0);
    assert_eq!(directory.members("r").await, vec![member]);
    assert!(signaling.all().await.is_empty());
}
