use crate::room::{Room, RoomCommand};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use huddle_core::{ConnectionId, RoomName};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

/// Maps room names to their event loops and connections to the rooms they
/// joined. Rooms are spawned on first join and kept afterwards.
#[derive(Clone)]
pub struct RoomDirectory {
    rooms: Arc<DashMap<RoomName, mpsc::Sender<RoomCommand>>>,
    memberships: Arc<DashMap<ConnectionId, HashSet<RoomName>>>,
    signaling: Arc<dyn SignalingOutput>,
    channel_capacity: usize,
}

impl RoomDirectory {
    pub fn new(signaling: Arc<dyn SignalingOutput>, channel_capacity: usize) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            memberships: Arc::new(DashMap::new()),
            signaling,
            channel_capacity,
        }
    }

    fn get_room_sender(&self, room: &RoomName) -> mpsc::Sender<RoomCommand> {
        self.rooms
            .entry(room.clone())
            .or_insert_with(|| {
                info!("Creating new room: {}", room);
                let (tx, rx) = mpsc::channel(self.channel_capacity);
                let actor = Room::new(room.clone(), rx, self.signaling.clone());
                tokio::spawn(actor.run());
                tx
            })
            .clone()
    }

    pub async fn join(&self, room: RoomName, connection_id: ConnectionId, username: String) {
        self.memberships
            .entry(connection_id)
            .or_default()
            .insert(room.clone());

        let cmd = RoomCommand::Join {
            connection_id,
            username,
        };
        if let Err(e) = self.get_room_sender(&room).send(cmd).await {
            error!("Room '{}' died: {}", room, e);
        }
    }

    /// Removes the connection from every room it joined and returns how many
    /// rooms that was.
    pub async fn leave(&self, connection_id: &ConnectionId) -> usize {
        let Some((_, rooms)) = self.memberships.remove(connection_id) else {
            return 0;
        };

        for room in &rooms {
            let Some(tx) = self.rooms.get(room).map(|entry| entry.value().clone()) else {
                continue;
            };
            let cmd = RoomCommand::Leave {
                connection_id: *connection_id,
            };
            if let Err(e) = tx.send(cmd).await {
                error!("Room '{}' died: {}", room, e);
            }
        }

        rooms.len()
    }

    /// Current members of `room`; empty when the room was never joined.
    pub async fn members(&self, room: &str) -> Vec<ConnectionId> {
        let Some(tx) = self.rooms.get(room).map(|entry| entry.value().clone()) else {
            return Vec::new();
        };

        let (reply, rx) = oneshot::channel();
        if tx.send(RoomCommand::Members { reply }).await.is_err() {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }

    pub fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomName> {
        self.memberships
            .get(connection_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
