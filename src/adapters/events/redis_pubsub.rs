//! Redis pub/sub event transport.
//!
//! - `RedisEventPublisher` - `PUBLISH {channel_prefix}{topic}` with the JSON envelope
//! - `RedisEventListener` - Background service that subscribes to topic
//!   channels and dispatches each message to the registered handlers
//!
//! Redis pub/sub is fire-and-forget: a message published while no listener
//! is connected is lost. That matches the best-effort contract of live
//! updates.
//!
//! ## Graceful Shutdown
//!
//! The listener watches a shutdown channel and returns after finishing the
//! message it is currently dispatching. [`RedisEventListener::supervise`]
//! reconnects after a lost subscription until shutdown.

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

// ════════════════════════════════════════════════════════════════════════════
// Publisher
// ════════════════════════════════════════════════════════════════════════════

/// Publishes envelopes to Redis channels named after their topic.
#[derive(Clone)]
pub struct RedisEventPublisher {
    conn: MultiplexedConnection,
    channel_prefix: String,
    timeout: Duration,
}

impl RedisEventPublisher {
    pub fn new(
        conn: MultiplexedConnection,
        channel_prefix: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            conn,
            channel_prefix: channel_prefix.into(),
            timeout,
        }
    }

    /// Channel an envelope with this topic is published on.
    pub fn channel_for(&self, topic: &str) -> String {
        format!("{}{}", self.channel_prefix, topic)
    }
}

impl std::fmt::Debug for RedisEventPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisEventPublisher")
            .field("channel_prefix", &self.channel_prefix)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let channel = self.channel_for(&event.event_type);
        let json = serde_json::to_string(&event).map_err(|e| {
            DomainError::new(
                ErrorCode::EventPublishError,
                format!("failed to serialize envelope: {}", e),
            )
        })?;

        let mut conn = self.conn.clone();
        let receivers: i64 =
            match tokio::time::timeout(self.timeout, conn.publish(&channel, json)).await {
                Ok(Ok(receivers)) => receivers,
                Ok(Err(e)) => {
                    error!(channel = %channel, error = %e, "failed to publish event");
                    return Err(DomainError::new(
                        ErrorCode::EventPublishError,
                        format!("failed to publish {}: {}", event.event_type, e),
                    ));
                }
                Err(_) => {
                    warn!(channel = %channel, "publishing event timed out");
                    return Err(DomainError::timeout("publish"));
                }
            };

        debug!(
            channel = %channel,
            event_id = %event.event_id,
            receivers,
            "published event"
        );
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Listener
// ════════════════════════════════════════════════════════════════════════════

/// Background service that feeds Redis pub/sub messages to event handlers.
pub struct RedisEventListener {
    client: Client,
    channel_prefix: String,
    handlers: RwLock<HashMap<String, Vec<Arc<dyn EventHandler>>>>,
}

impl RedisEventListener {
    pub fn new(client: Client, channel_prefix: impl Into<String>) -> Self {
        Self {
            client,
            channel_prefix: channel_prefix.into(),
            handlers: RwLock::new(HashMap::new()),
        }
    }

    fn channels(&self) -> Vec<String> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .map(|topic| format!("{}{}", self.channel_prefix, topic))
            .collect()
    }

    /// Run the listener loop until the shutdown signal is received.
    ///
    /// # Errors
    ///
    /// `EventPublishError` if subscribing fails or the server closes the
    /// subscription.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<(), DomainError> {
        if *shutdown.borrow() {
            return Ok(());
        }
        let channels = self.channels();
        if channels.is_empty() {
            warn!("event listener started without handlers");
        }

        let conn = self.client.get_async_connection().await.map_err(|e| {
            error!(error = %e, "failed to open pub/sub connection");
            DomainError::new(
                ErrorCode::EventPublishError,
                format!("failed to open pub/sub connection: {}", e),
            )
        })?;
        let mut pubsub = conn.into_pubsub();
        for channel in &channels {
            pubsub.subscribe(channel).await.map_err(|e| {
                error!(channel = %channel, error = %e, "failed to subscribe");
                DomainError::new(
                    ErrorCode::EventPublishError,
                    format!("failed to subscribe to {}: {}", channel, e),
                )
            })?;
        }
        info!(channels = ?channels, "event listener subscribed");

        let mut messages = pubsub.on_message();
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("event listener shutting down");
                        return Ok(());
                    }
                }
                message = messages.next() => {
                    let Some(message) = message else {
                        error!("pub/sub stream closed by server");
                        return Err(DomainError::new(
                            ErrorCode::EventPublishError,
                            "pub/sub stream closed",
                        ));
                    };
                    match message.get_payload::<String>() {
                        Ok(payload) => {
                            let handled = self.dispatch_payload(&payload).await;
                            debug!(handled, "dispatched pub/sub message");
                        }
                        Err(e) => warn!(
                            channel = message.get_channel_name(),
                            error = %e,
                            "dropping non-text pub/sub message"
                        ),
                    }
                }
            }
        }
    }

    /// Keep the listener running until shutdown, reconnecting after
    /// `retry_delay` whenever [`run`](Self::run) fails.
    pub async fn supervise(&self, mut shutdown: watch::Receiver<bool>, retry_delay: Duration) {
        loop {
            if *shutdown.borrow() {
                return;
            }
            match self.run(shutdown.clone()).await {
                Ok(()) => return,
                Err(e) => {
                    error!(error = %e, retry_in = ?retry_delay, "event listener failed");
                }
            }
            tokio::select! {
                _ = tokio::time::sleep(retry_delay) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("event listener shutting down");
                        return;
                    }
                }
            }
        }
    }

    /// Decode one message and hand it to every handler for its topic.
    ///
    /// Returns the number of handlers that completed successfully. An
    /// undecodable payload is logged and dropped.
    pub async fn dispatch_payload(&self, payload: &str) -> usize {
        let envelope: EventEnvelope = match serde_json::from_str(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "dropping undecodable event");
                return 0;
            }
        };

        let subscribed: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&envelope.event_type)
            .cloned()
            .unwrap_or_default();

        let mut succeeded = 0;
        for handler in subscribed {
            match handler.handle(envelope.clone()).await {
                Ok(()) => succeeded += 1,
                Err(e) => error!(
                    handler = handler.name(),
                    event_type = %envelope.event_type,
                    event_id = %envelope.event_id,
                    error = %e,
                    "event handler failed"
                ),
            }
        }
        succeeded
    }
}

impl EventSubscriber for RedisEventListener {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct Recorder(Mutex<Vec<String>>);

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
            self.0.lock().unwrap().push(event.aggregate_id);
            Ok(())
        }
        fn name(&self) -> &'static str {
            "Recorder"
        }
    }

    fn listener() -> RedisEventListener {
        // Opening a client does not connect
        let client = Client::open("redis://127.0.0.1:6379").unwrap();
        RedisEventListener::new(client, "estimatex:events:")
    }

    /// Nothing listens on port 1, so every connect is refused.
    fn unreachable_listener() -> RedisEventListener {
        let client = Client::open("redis://127.0.0.1:1").unwrap();
        RedisEventListener::new(client, "estimatex:events:")
    }

    #[test]
    fn channels_follow_subscriptions() {
        let listener = listener();
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        listener.subscribe_all(&["RevealVotes", "ResetVotes"], recorder);

        let mut channels = listener.channels();
        channels.sort();
        assert_eq!(
            channels,
            vec![
                "estimatex:events:ResetVotes".to_string(),
                "estimatex:events:RevealVotes".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn dispatch_routes_by_event_type() {
        let listener = listener();
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        listener.subscribe("RevealVotes", recorder.clone());

        let reveal = EventEnvelope::new("RevealVotes", "aB3xY9", "Room", json!({}));
        let reset = EventEnvelope::new("ResetVotes", "zz9999", "Room", json!({}));

        let handled = listener
            .dispatch_payload(&serde_json::to_string(&reveal).unwrap())
            .await;
        let ignored = listener
            .dispatch_payload(&serde_json::to_string(&reset).unwrap())
            .await;

        assert_eq!((handled, ignored), (1, 0));
        assert_eq!(*recorder.0.lock().unwrap(), vec!["aB3xY9".to_string()]);
    }

    #[tokio::test]
    async fn undecodable_payload_is_dropped() {
        let listener = listener();
        listener.subscribe("RevealVotes", Arc::new(Recorder(Mutex::new(Vec::new()))));

        assert_eq!(listener.dispatch_payload("not json").await, 0);
    }

    #[tokio::test]
    async fn run_fails_when_the_server_is_unreachable() {
        let listener = unreachable_listener();
        listener.subscribe("RevealVotes", Arc::new(Recorder(Mutex::new(Vec::new()))));
        let (_tx, rx) = watch::channel(false);

        let err = tokio::time::timeout(Duration::from_secs(5), listener.run(rx))
            .await
            .expect("run should give up promptly")
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::EventPublishError);
    }

    #[tokio::test]
    async fn run_returns_immediately_after_shutdown() {
        let listener = unreachable_listener();
        let (_tx, rx) = watch::channel(true);

        assert!(listener.run(rx).await.is_ok());
    }

    #[tokio::test]
    async fn supervise_keeps_retrying_until_shutdown() {
        let listener = Arc::new(unreachable_listener());
        listener.subscribe("RevealVotes", Arc::new(Recorder(Mutex::new(Vec::new()))));
        let (tx, rx) = watch::channel(false);

        let task = {
            let listener = listener.clone();
            tokio::spawn(async move {
                listener.supervise(rx, Duration::from_millis(20)).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!task.is_finished());

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("supervisor should stop on shutdown")
            .unwrap();
    }
}
