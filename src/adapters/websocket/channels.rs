//! Room push channels for live updates.
//!
//! One broadcast channel per room (`room-{id}`), created when its first
//! client joins and dropped when the last one leaves.
//!
//! ```text
//! Channel: room-aB3xY9    Channel: room-Qw12Er
//! ├── client-a            └── client-d
//! └── client-b
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::domain::foundation::DomainError;
use crate::ports::PushNotifier;

use super::messages::PushUpdate;

/// Default number of buffered pushes per channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Unique identifier for a WebSocket client connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry of room push channels.
///
/// Each channel is a bounded `broadcast`; a receiver that falls more than
/// `capacity` messages behind loses the oldest ones.
pub struct RoomChannels {
    channels: RwLock<HashMap<String, broadcast::Sender<PushUpdate>>>,
    /// client → channel, for cleanup on disconnect.
    client_channels: RwLock<HashMap<ClientId, String>>,
    capacity: usize,
}

impl RoomChannels {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            client_channels: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Join a client to a channel, creating the channel if needed.
    pub async fn join(&self, channel: &str, client_id: ClientId) -> broadcast::Receiver<PushUpdate> {
        let mut channels = self.channels.write().await;
        let sender = channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0);

        self.client_channels
            .write()
            .await
            .insert(client_id, channel.to_string());

        sender.subscribe()
    }

    /// Remove a client; the channel goes away with its last receiver.
    ///
    /// Call after the client's receiver has been dropped.
    pub async fn leave(&self, client_id: &ClientId) {
        let Some(channel) = self.client_channels.write().await.remove(client_id) else {
            return;
        };
        let mut channels = self.channels.write().await;
        if channels
            .get(&channel)
            .is_some_and(|sender| sender.receiver_count() == 0)
        {
            channels.remove(&channel);
        }
    }

    /// Send an update to everyone on the channel. Returns how many
    /// receivers it reached; zero when nobody is listening.
    pub async fn broadcast(&self, channel: &str, update: PushUpdate) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .and_then(|sender| sender.send(update).ok())
            .unwrap_or(0)
    }

    pub async fn client_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    pub async fn active_channels(&self) -> Vec<String> {
        self.channels.read().await.keys().cloned().collect()
    }

    pub async fn total_client_count(&self) -> usize {
        self.client_channels.read().await.len()
    }
}

impl Default for RoomChannels {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[async_trait]
impl PushNotifier for RoomChannels {
    async fn trigger(&self, channel: &str, event: &str, data: JsonValue) -> Result<(), DomainError> {
        let reached = self.broadcast(channel, PushUpdate::new(event, data)).await;
        tracing::trace!(channel, event, reached, "push delivered");
        Ok(())
    }
}
