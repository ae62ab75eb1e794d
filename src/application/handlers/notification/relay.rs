//! NotificationRelay - Event handler forwarding room events to live clients.
//!
//! One envelope in, at most one push out:
//!
//! | Topic               | Push event           |
//! |---------------------|----------------------|
//! | `ParticipantJoined` | `participant-joined` |
//! | `ParticipantVoted`  | `participant-voted`  |
//! | `RevealVotes`       | `reveal-votes`       |
//! | `ResetVotes`        | `reset-votes`        |
//!
//! Every push goes to channel `room-{room_id}` with the typed payload as data.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope, RoomId};
use crate::domain::room::{ParticipantJoined, ParticipantVoted, ResetVotes, RevealVotes, ROOM_TOPICS};
use crate::ports::{EventHandler, EventSubscriber, PushNotifier};

/// Push channel carrying one room's live updates.
pub fn channel_for_room(room_id: &RoomId) -> String {
    format!("room-{}", room_id)
}

/// Push event name for a fanout topic, `None` for anything else.
pub fn push_event_name(topic: &str) -> Option<&'static str> {
    match topic {
        ParticipantJoined::TOPIC => Some("participant-joined"),
        ParticipantVoted::TOPIC => Some("participant-voted"),
        RevealVotes::TOPIC => Some("reveal-votes"),
        ResetVotes::TOPIC => Some("reset-votes"),
        _ => None,
    }
}

/// Forwards room events to a [`PushNotifier`].
///
/// An undecodable payload or a failed push is returned as an error; the
/// transport decides whether that invocation is redelivered.
pub struct NotificationRelay {
    notifier: Arc<dyn PushNotifier>,
}

impl NotificationRelay {
    pub fn new(notifier: Arc<dyn PushNotifier>) -> Self {
        Self { notifier }
    }

    /// Subscribe a shared relay to every room topic.
    pub fn register(self: &Arc<Self>, subscriber: &impl EventSubscriber) {
        subscriber.subscribe_all(&ROOM_TOPICS, self.clone());
    }

    /// Decode the envelope into the channel it belongs to and the data to push.
    fn route(event: &EventEnvelope) -> Result<(RoomId, JsonValue), DomainError> {
        match event.event_type.as_str() {
            ParticipantJoined::TOPIC => {
                let e: ParticipantJoined = decode(event)?;
                Ok((e.room_id.clone(), encode(&e)?))
            }
            ParticipantVoted::TOPIC => {
                let e: ParticipantVoted = decode(event)?;
                Ok((e.room_id.clone(), encode(&e)?))
            }
            RevealVotes::TOPIC => {
                let e: RevealVotes = decode(event)?;
                Ok((e.room_id.clone(), encode(&e)?))
            }
            ResetVotes::TOPIC => {
                let e: ResetVotes = decode(event)?;
                Ok((e.room_id.clone(), encode(&e)?))
            }
            other => Err(unmapped(other)),
        }
    }
}

fn unmapped(topic: &str) -> DomainError {
    DomainError::new(
        ErrorCode::ValidationFailed,
        format!("no push mapping for event type {}", topic),
    )
}

fn decode<T: DeserializeOwned>(event: &EventEnvelope) -> Result<T, DomainError> {
    serde_json::from_value(event.payload.clone()).map_err(|e| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("failed to unmarshal {} payload: {}", event.event_type, e),
        )
        .with_detail("event_id", event.event_id.to_string())
    })
}

fn encode<T: Serialize>(payload: &T) -> Result<JsonValue, DomainError> {
    serde_json::to_value(payload)
        .map_err(|e| DomainError::new(ErrorCode::InternalError, e.to_string()))
}

#[async_trait]
impl EventHandler for NotificationRelay {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let push_event = push_event_name(&event.event_type).ok_or_else(|| unmapped(&event.event_type))?;

        let (room_id, data) = Self::route(&event).map_err(|e| {
            tracing::error!(
                event_type = %event.event_type,
                event_id = %event.event_id,
                error = %e,
                "dropping undecodable room event"
            );
            e
        })?;
        let channel = channel_for_room(&room_id);

        self.notifier.trigger(&channel, push_event, data).await?;

        tracing::debug!(channel = %channel, event = push_event, "pushed room event");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "NotificationRelay"
    }
}
