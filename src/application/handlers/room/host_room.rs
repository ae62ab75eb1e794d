//! HostRoomHandler - Command handler for opening a new room.

use std::sync::Arc;

use crate::domain::foundation::{AccessToken, CommandMetadata, ParticipantName};
use crate::domain::room::{Participant, Room, RoomError};
use crate::ports::{CredentialService, RoomRepository};

use super::dependency_failure;

/// Command to open a room hosted by `name`.
#[derive(Debug, Clone)]
pub struct HostRoomCommand {
    pub name: String,
}

/// Result of successful room creation.
#[derive(Debug, Clone)]
pub struct HostRoomResult {
    pub room: Room,
    pub admin: Participant,
    pub access_token: AccessToken,
}

/// Handler for hosting rooms. Hosting publishes no event.
pub struct HostRoomHandler {
    repository: Arc<dyn RoomRepository>,
    credentials: Arc<dyn CredentialService>,
}

impl HostRoomHandler {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        credentials: Arc<dyn CredentialService>,
    ) -> Self {
        Self {
            repository,
            credentials,
        }
    }

    pub async fn handle(
        &self,
        cmd: HostRoomCommand,
        metadata: CommandMetadata,
    ) -> Result<HostRoomResult, RoomError> {
        // 1. Validate before touching the store
        let name = ParticipantName::new(cmd.name)?;

        // 2. Claim a room id
        let room = self
            .repository
            .create_room()
            .await
            .map_err(|e| dependency_failure("create_room", e))?;

        // 3. The host is the room's only admin
        let admin = self
            .repository
            .create_participant(room.id(), &name, true)
            .await
            .map_err(|e| dependency_failure("create_participant", e))?;

        // 4. Hand the host a credential
        let access_token = self.credentials.issue(&admin)?;

        tracing::info!(
            room_id = %room.id(),
            participant = %name,
            correlation_id = metadata.correlation_id(),
            "room hosted"
        );

        Ok(HostRoomResult {
            room,
            admin,
            access_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::room::fixtures::{metadata, FailingRepository, Harness};
    use crate::domain::foundation::ROOM_ID_LENGTH;

    fn handler(h: &Harness) -> HostRoomHandler {
        HostRoomHandler::new(h.repo.clone(), h.credentials.clone())
    }

    #[tokio::test]
    async fn hosts_room_with_admin_participant() {
        let h = Harness::new();

        let result = handler(&h)
            .handle(HostRoomCommand { name: "Alice".into() }, metadata())
            .await
            .unwrap();

        assert_eq!(result.room.id().as_str().len(), ROOM_ID_LENGTH);
        assert!(result.room.id().is_well_formed());
        assert!(result.admin.is_admin());
        assert_eq!(result.admin.latest_vote(), "");

        let stored = h.participant(&result.room, "Alice").await.unwrap();
        assert_eq!(stored, result.admin);
    }

    #[tokio::test]
    async fn issued_token_names_the_admin() {
        let h = Harness::new();

        let result = handler(&h)
            .handle(HostRoomCommand { name: "  Alice ".into() }, metadata())
            .await
            .unwrap();
        let claims = h.credentials.verify(result.access_token.as_str()).unwrap();

        assert_eq!(&claims.room_id, result.room.id());
        assert_eq!(claims.name.as_str(), "Alice");
        assert!(claims.is_admin());
    }

    #[tokio::test]
    async fn publishes_nothing() {
        let h = Harness::new();

        handler(&h)
            .handle(HostRoomCommand { name: "Alice".into() }, metadata())
            .await
            .unwrap();

        assert_eq!(h.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn blank_name_is_rejected_before_any_store_call() {
        let h = Harness::new();

        let result = handler(&h)
            .handle(HostRoomCommand { name: "   ".into() }, metadata())
            .await;

        assert!(matches!(result, Err(RoomError::ValidationFailed { .. })));
        assert_eq!(h.repo.room_count().await, 0);
    }

    #[tokio::test]
    async fn store_failure_is_a_dependency_error() {
        let h = Harness::new();
        let handler = HostRoomHandler::new(Arc::new(FailingRepository), h.credentials.clone());

        let result = handler
            .handle(HostRoomCommand { name: "Alice".into() }, metadata())
            .await;

        assert!(matches!(result, Err(RoomError::Dependency(_))));
    }
}
