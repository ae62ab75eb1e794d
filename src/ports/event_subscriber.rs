//! EventSubscriber port - Interface for consuming fanout events.
//!
//! Handlers register for topics; whichever transport delivers the events
//! (in-process bus or Redis listener) invokes them one envelope at a time.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Consumer of a single fanout event.
///
/// A failing handler only fails its own invocation; other handlers
/// registered for the same topic still run. Transports may redeliver, so
/// handlers should tolerate seeing an envelope twice.
///
/// # Example
///
/// ```ignore
/// struct VoteCounter { /* ... */ }
///
/// #[async_trait]
/// impl EventHandler for VoteCounter {
///     async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
///         let voted: ParticipantVoted = event.payload_as()?;
///         // Count the vote...
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "VoteCounter"
///     }
/// }
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for log lines (e.g., "NotificationRelay: push failed").
    fn name(&self) -> &'static str;
}

/// Registration side of an event transport.
///
/// ```ignore
/// subscriber.subscribe("ParticipantVoted", vote_counter);
/// subscriber.subscribe_all(&ROOM_TOPICS, relay);
/// ```
pub trait EventSubscriber: Send + Sync {
    /// Invoke `handler` for every event whose `event_type` equals `event_type`.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);

    /// Register the same handler for several topics.
    fn subscribe_all(&self, event_types: &[&str], handler: Arc<dyn EventHandler>) {
        for event_type in event_types {
            self.subscribe(event_type, Arc::clone(&handler));
        }
    }
}

/// A transport that both publishes and delivers.
pub trait EventBus: super::EventPublisher + EventSubscriber {}

impl<T: super::EventPublisher + EventSubscriber> EventBus for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_ports_are_object_safe() {
        fn _handler(_: &dyn EventHandler) {}
        fn _subscriber(_: &dyn EventSubscriber) {}
        fn _bus(_: &dyn EventBus) {}
    }
}
