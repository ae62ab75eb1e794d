//! JoinRoomHandler - Command handler for joining an existing room.

use std::sync::Arc;

use crate::domain::foundation::{AccessToken, CommandMetadata, ParticipantName};
use crate::domain::room::{Participant, ParticipantJoined, RoomError};
use crate::ports::{CredentialService, EventPublisher, RoomRepository};

use super::{dependency_failure, parse_room_code, publish_event};

/// Command to join room `room_id` as `name`.
#[derive(Debug, Clone)]
pub struct JoinRoomCommand {
    pub room_id: String,
    pub name: String,
}

/// Result of a successful join.
#[derive(Debug, Clone)]
pub struct JoinRoomResult {
    pub participant: Participant,
    pub access_token: AccessToken,
}

/// Handler for joining rooms.
///
/// The existence checks and the participant write are separate store
/// calls, so two simultaneous joins with one name can both succeed; the
/// later write wins.
pub struct JoinRoomHandler {
    repository: Arc<dyn RoomRepository>,
    credentials: Arc<dyn CredentialService>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl JoinRoomHandler {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        credentials: Arc<dyn CredentialService>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            credentials,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: JoinRoomCommand,
        metadata: CommandMetadata,
    ) -> Result<JoinRoomResult, RoomError> {
        // 1. Validate input
        let room_id = parse_room_code(&cmd.room_id)?;
        let name = ParticipantName::new(cmd.name)?;

        // 2. The room must exist
        if self
            .repository
            .find_room(&room_id)
            .await
            .map_err(|e| dependency_failure("find_room", e))?
            .is_none()
        {
            return Err(RoomError::room_not_found(room_id));
        }

        // 3. The name must be free in this room
        if self
            .repository
            .find_participant(&room_id, &name)
            .await
            .map_err(|e| dependency_failure("find_participant", e))?
            .is_some()
        {
            return Err(RoomError::already_exists(room_id, name.as_str()));
        }

        // 4. Persist the participant
        let participant = self
            .repository
            .create_participant(&room_id, &name, false)
            .await
            .map_err(|e| dependency_failure("create_participant", e))?;

        // 5. Credential, then announce the arrival
        let access_token = self.credentials.issue(&participant)?;

        let event = ParticipantJoined {
            room_id: room_id.clone(),
            participant_name: name.clone(),
        };
        publish_event(self.event_publisher.as_ref(), &event, &name, &metadata).await?;

        tracing::info!(
            room_id = %room_id,
            participant = %name,
            correlation_id = metadata.correlation_id(),
            "participant joined"
        );

        Ok(JoinRoomResult {
            participant,
            access_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::room::fixtures::{
        metadata, name, FailingPublisher, FailingRepository, Harness,
    };
    use crate::domain::foundation::{ErrorCode, Vote};
    use serde_json::json;

    fn handler(h: &Harness) -> JoinRoomHandler {
        JoinRoomHandler::new(h.repo.clone(), h.credentials.clone(), h.bus.clone())
    }

    fn join(room_id: &str, name: &str) -> JoinRoomCommand {
        JoinRoomCommand {
            room_id: room_id.into(),
            name: name.into(),
        }
    }

    #[tokio::test]
    async fn joins_as_non_admin() {
        let h = Harness::new();
        let room = h.room_with("Alice", &[]).await;

        let result = handler(&h)
            .handle(join(room.id().as_str(), "Bob"), metadata())
            .await
            .unwrap();

        assert!(!result.participant.is_admin());
        let claims = h.credentials.verify(result.access_token.as_str()).unwrap();
        assert_eq!(claims.name.as_str(), "Bob");
        assert!(!claims.is_admin());
        assert!(h.participant(&room, "Bob").await.is_some());
    }

    #[tokio::test]
    async fn publishes_participant_joined() {
        let h = Harness::new();
        let room = h.room_with("Alice", &[]).await;

        handler(&h)
            .handle(join(room.id().as_str(), "Bob"), metadata())
            .await
            .unwrap();

        let events = h.bus.events_of_type("ParticipantJoined");
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].payload,
            json!({"room_id": room.id().as_str(), "participant_name": "Bob"})
        );
        assert_eq!(
            events[0].metadata.correlation_id.as_deref(),
            Some("test-correlation")
        );
        assert_eq!(events[0].metadata.actor.as_deref(), Some("Bob"));
    }

    #[tokio::test]
    async fn unknown_room_is_not_found() {
        let h = Harness::new();

        let result = handler(&h).handle(join("zzzzzz", "Bob"), metadata()).await;

        assert!(matches!(result, Err(RoomError::RoomNotFound(_))));
        assert_eq!(h.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn taken_name_is_a_conflict_regardless_of_vote_state() {
        let h = Harness::new();
        let room = h.room_with("Alice", &["Bob"]).await;

        let first = handler(&h)
            .handle(join(room.id().as_str(), "Bob"), metadata())
            .await;
        assert!(matches!(
            first,
            Err(RoomError::ParticipantAlreadyExists { .. })
        ));

        h.repo
            .cast_vote(room.id(), &name("Bob"), &Vote::new("3").unwrap())
            .await
            .unwrap();
        let second = handler(&h)
            .handle(join(room.id().as_str(), "Bob"), metadata())
            .await;
        assert!(matches!(
            second,
            Err(RoomError::ParticipantAlreadyExists { .. })
        ));

        // The existing record is untouched
        let bob = h.participant(&room, "Bob").await.unwrap();
        assert_eq!(bob.latest_vote(), "3");
        assert_eq!(h.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn blank_inputs_are_validation_errors() {
        let h = Harness::new();
        let room = h.room_with("Alice", &[]).await;

        let no_room = handler(&h).handle(join(" ", "Bob"), metadata()).await;
        let no_name = handler(&h)
            .handle(join(room.id().as_str(), ""), metadata())
            .await;

        assert!(matches!(
            no_room,
            Err(RoomError::ValidationFailed { ref field, .. }) if field == "room_id"
        ));
        assert!(matches!(
            no_name,
            Err(RoomError::ValidationFailed { ref field, .. }) if field == "name"
        ));
    }

    #[tokio::test]
    async fn publish_failure_fails_the_join_but_keeps_the_participant() {
        let h = Harness::new();
        let room = h.room_with("Alice", &[]).await;
        let handler = JoinRoomHandler::new(
            h.repo.clone(),
            h.credentials.clone(),
            Arc::new(FailingPublisher),
        );

        let result = handler
            .handle(join(room.id().as_str(), "Bob"), metadata())
            .await;

        assert!(matches!(result, Err(RoomError::Dependency(_))));
        assert!(h.participant(&room, "Bob").await.is_some());
    }

    #[tokio::test]
    async fn store_failure_is_a_dependency_error() {
        let h = Harness::new();
        let handler = JoinRoomHandler::new(
            Arc::new(FailingRepository),
            h.credentials.clone(),
            h.bus.clone(),
        );

        let result = handler.handle(join("aB3xY9", "Bob"), metadata()).await;

        let err = result.unwrap_err();
        assert!(err.is_server_error());
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
