use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;
use uuid::Uuid;

/// An event pushed to connected clients. Delivery is best-effort; the
/// notification row is the durable record.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RealtimeEvent {
    pub event: String,
    pub payload: serde_json::Value,
}

impl RealtimeEvent {
    pub fn new(event: &str, payload: serde_json::Value) -> Self {
        Self {
            event: event.to_string(),
            payload,
        }
    }
}

/// Explicit connection registry replacing a process-wide broadcast
/// singleton: connections are registered per user and events are either
/// addressed (`publish`) or fanned out to everyone (`broadcast`).
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    channels: RwLock<HashMap<Uuid, Vec<UnboundedSender<RealtimeEvent>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a new client connection for a user and returns the
    /// receiving half. Dropping the receiver detaches the connection; the
    /// dead sender is pruned on the next publish.
    pub async fn register(&self, user_id: Uuid) -> UnboundedReceiver<RealtimeEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut channels = self.channels.write().await;
        channels.entry(user_id).or_default().push(tx);
        rx
    }

    /// Sends an event to every live connection of one user. Returns how many
    /// connections took delivery.
    pub async fn publish(&self, user_id: Uuid, event: RealtimeEvent) -> usize {
        let mut channels = self.channels.write().await;
        let Some(senders) = channels.get_mut(&user_id) else {
            return 0;
        };
        senders.retain(|tx| tx.send(event.clone()).is_ok());
        let delivered = senders.len();
        if senders.is_empty() {
            channels.remove(&user_id);
        }
        delivered
    }

    /// Sends an event to every connection of every user.
    pub async fn broadcast(&self, event: RealtimeEvent) -> usize {
        let mut channels = self.channels.write().await;
        let mut delivered = 0;
        channels.retain(|_, senders| {
            senders.retain(|tx| tx.send(event.clone()).is_ok());
            delivered += senders.len();
            !senders.is_empty()
        });
        delivered
    }

    pub async fn connection_count(&self) -> usize {
        self.channels.read().await.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn publish_reaches_only_the_addressed_user() {
        let registry = ConnectionRegistry::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let mut alice_rx = registry.register(alice).await;
        let mut bob_rx = registry.register(bob).await;

        let delivered = registry
            .publish(alice, RealtimeEvent::new("notification", json!({"n": 1})))
            .await;
        assert_eq!(delivered, 1);

        let got = alice_rx.recv().await.unwrap();
        assert_eq!(got.event, "notification");
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_reaches_every_connection() {
        let registry = ConnectionRegistry::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let mut alice_rx = registry.register(alice).await;
        let mut bob_rx = registry.register(bob).await;

        let delivered = registry
            .broadcast(RealtimeEvent::new("jobAdded", json!({})))
            .await;
        assert_eq!(delivered, 2);
        assert_eq!(alice_rx.recv().await.unwrap().event, "jobAdded");
        assert_eq!(bob_rx.recv().await.unwrap().event, "jobAdded");
    }

    #[tokio::test]
    async fn dropped_receivers_are_pruned() {
        let registry = ConnectionRegistry::new();
        let alice = Uuid::new_v4();

        let rx = registry.register(alice).await;
        drop(rx);

        let delivered = registry
            .publish(alice, RealtimeEvent::new("notification", json!({})))
            .await;
        assert_eq!(delivered, 0);
        assert_eq!(registry.connection_count().await, 0);
    }

    #[tokio::test]
    async fn publish_to_unknown_user_is_a_noop() {
        let registry = ConnectionRegistry::new();
        let delivered = registry
            .publish(Uuid::new_v4(), RealtimeEvent::new("notification", json!({})))
            .await;
        assert_eq!(delivered, 0);
    }
}
