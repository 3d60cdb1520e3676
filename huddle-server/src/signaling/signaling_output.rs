use async_trait::async_trait;
use huddle_core::{ConnectionId, ServerMessage};

/// Delivery seam between routing logic and the connections' outbound queues.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Push a frame to one connection. Fire-and-forget: `false` only tells the
    /// caller the frame was dropped because the target is gone.
    async fn deliver(&self, to: &ConnectionId, msg: ServerMessage) -> bool;
}
