//! EventPublisher port - Interface for publishing fanout events.
//!
//! This port defines how the use cases publish events without knowing
//! about the underlying transport mechanism (in-memory, Redis, etc.).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing fanout events.
///
/// Implementations must ensure:
/// - The envelope's `event_type` is used as the topic
/// - Errors are propagated to the caller
///
/// Publishing happens after the store mutation has committed. A failure
/// here fails the use case but does not undo the mutation.
///
/// # Example
///
/// ```ignore
/// let event = RevealVotes { room_id }.to_envelope()?;
/// publisher.publish(event).await?;
/// ```
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish several events in order, stopping at the first failure.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct Recording(Mutex<Vec<String>>);

    #[async_trait]
    impl EventPublisher for Recording {
        async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
            self.0.lock().unwrap().push(event.event_type);
            Ok(())
        }
    }

    #[tokio::test]
    async fn publish_all_preserves_order() {
        let publisher = Recording(Mutex::new(Vec::new()));
        let events = vec![
            EventEnvelope::new("RevealVotes", "r", "Room", json!({})),
            EventEnvelope::new("ResetVotes", "r", "Room", json!({})),
        ];

        publisher.publish_all(events).await.unwrap();

        assert_eq!(
            *publisher.0.lock().unwrap(),
            vec!["RevealVotes".to_string(), "ResetVotes".to_string()]
        );
    }
}
