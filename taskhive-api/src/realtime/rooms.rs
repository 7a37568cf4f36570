//! Per-project broadcast rooms.
//!
//! Each project with at least one watching connection gets a room backed
//! by a `tokio::sync::broadcast` channel. Task route handlers publish
//! serialized event frames into the room after their mutation commits;
//! every joined connection receives every frame, including the one that
//! triggered it.
//!
//! Delivery is at-most-once with no backlog. A subscriber that falls too
//! far behind loses the oldest frames; clients are expected to re-fetch
//! state after reconnecting.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, trace};
use uuid::Uuid;

/// Frames buffered per room before slow subscribers start lagging
pub const ROOM_CAPACITY: usize = 1024;

/// Registry of live project rooms
///
/// The registry is the only shared mutable state in the server; the lock
/// is held just long enough to clone a sender or prune an entry. Cloning
/// the registry shares the underlying map.
#[derive(Clone, Default)]
pub struct RoomRegistry {
    rooms: Arc<Mutex<HashMap<Uuid, broadcast::Sender<String>>>>,
}

impl RoomRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to a project's room, creating the room on first join
    ///
    /// Join is advisory: no authentication or membership check happens
    /// here, so a subscriber may watch projects it cannot read via the
    /// HTTP API.
    pub async fn join(&self, project_id: Uuid) -> broadcast::Receiver<String> {
        let mut rooms = self.rooms.lock().await;
        let sender = rooms
            .entry(project_id)
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0);

        debug!(
            project_id = %project_id,
            subscribers = sender.receiver_count() + 1,
            "Connection joined room"
        );

        sender.subscribe()
    }

    /// Prunes the room if it has no subscribers left
    ///
    /// Callers drop their receiver first, then report the leave. A room
    /// that still has other subscribers is kept.
    pub async fn leave(&self, project_id: Uuid) {
        let mut rooms = self.rooms.lock().await;
        if let Some(sender) = rooms.get(&project_id) {
            if sender.receiver_count() == 0 {
                rooms.remove(&project_id);
                debug!(project_id = %project_id, "Pruned empty room");
            }
        }
    }

    /// Broadcasts a frame to every connection joined to the room
    ///
    /// Returns the number of subscribers the frame was queued for.
    /// Publishing to an absent or empty room is a no-op, not an error.
    pub async fn publish(&self, project_id: Uuid, frame: String) -> usize {
        let sender = {
            let rooms = self.rooms.lock().await;
            rooms.get(&project_id).cloned()
        };

        match sender {
            Some(sender) => sender.send(frame).unwrap_or(0),
            None => {
                trace!(project_id = %project_id, "No room for project, frame dropped");
                0
            }
        }
    }

    /// Number of live rooms
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_join_creates_room() {
        let registry = RoomRegistry::new();
        let project_id = Uuid::new_v4();

        assert_eq!(registry.room_count().await, 0);
        let _rx = registry.join(project_id).await;
        assert_eq!(registry.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let registry = RoomRegistry::new();
        let project_id = Uuid::new_v4();

        let mut rx_a = registry.join(project_id).await;
        let mut rx_b = registry.join(project_id).await;

        let delivered = registry.publish(project_id, "frame".to_string()).await;
        assert_eq!(delivered, 2);

        assert_eq!(rx_a.recv().await.expect("Should receive frame"), "frame");
        assert_eq!(rx_b.recv().await.expect("Should receive frame"), "frame");
    }

    #[tokio::test]
    async fn test_publish_without_room_is_noop() {
        let registry = RoomRegistry::new();

        let delivered = registry.publish(Uuid::new_v4(), "frame".to_string()).await;
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn test_rooms_are_isolated() {
        let registry = RoomRegistry::new();
        let project_a = Uuid::new_v4();
        let project_b = Uuid::new_v4();

        let mut rx_a = registry.join(project_a).await;
        let mut rx_b = registry.join(project_b).await;

        registry.publish(project_a, "for-a".to_string()).await;

        assert_eq!(rx_a.recv().await.expect("Should receive frame"), "for-a");
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_leave_prunes_empty_room() {
        let registry = RoomRegistry::new();
        let project_id = Uuid::new_v4();

        let rx = registry.join(project_id).await;
        drop(rx);
        registry.leave(project_id).await;

        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_leave_keeps_room_with_other_subscribers() {
        let registry = RoomRegistry::new();
        let project_id = Uuid::new_v4();

        let _rx_a = registry.join(project_id).await;
        let rx_b = registry.join(project_id).await;

        drop(rx_b);
        registry.leave(project_id).await;

        assert_eq!(registry.room_count().await, 1);
    }
}
