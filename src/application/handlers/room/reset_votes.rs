//! ResetVotesHandler - Command handler for clearing every vote in a room.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, ErrorCode};
use crate::domain::room::{ParticipantIdentity, ResetVotes, RoomError};
use crate::ports::{EventPublisher, RoomRepository};

use super::{dependency_failure, publish_event};

/// Command to reset the caller's room.
#[derive(Debug, Clone)]
pub struct ResetVotesCommand {
    pub caller: ParticipantIdentity,
}

/// Handler for resetting votes.
///
/// Clears are issued one participant at a time. A failure part-way leaves
/// the earlier participants cleared and publishes nothing.
pub struct ResetVotesHandler {
    repository: Arc<dyn RoomRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl ResetVotesHandler {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: ResetVotesCommand,
        metadata: CommandMetadata,
    ) -> Result<(), RoomError> {
        let caller = cmd.caller;
        if !caller.is_admin {
            tracing::warn!(
                room_id = %caller.room_id,
                participant = %caller.name,
                "non-admin tried to reset votes"
            );
            return Err(RoomError::forbidden());
        }

        let participants = self
            .repository
            .find_participants(&caller.room_id)
            .await
            .map_err(|e| dependency_failure("find_participants", e))?;

        for participant in &participants {
            match self
                .repository
                .clear_vote(participant.room_id(), participant.name())
                .await
            {
                Ok(()) => {}
                // Gone since the scan; nothing left to clear
                Err(e) if e.code == ErrorCode::ParticipantNotFound => {
                    tracing::debug!(participant = %participant.name(), "participant vanished during reset");
                }
                Err(e) => return Err(dependency_failure("clear_vote", e)),
            }
        }

        let event = ResetVotes {
            room_id: caller.room_id.clone(),
        };
        publish_event(self.event_publisher.as_ref(), &event, &caller.name, &metadata).await?;

        tracing::info!(
            room_id = %caller.room_id,
            cleared = participants.len(),
            "votes reset"
        );
        Ok(())
    }
}
