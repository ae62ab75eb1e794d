//! CastVoteHandler - Command handler for recording a participant's vote.

use std::sync::Arc;

use crate::domain::foundation::{CommandMetadata, ErrorCode, Vote};
use crate::domain::room::{ParticipantIdentity, ParticipantVoted, RoomError};
use crate::ports::{EventPublisher, RoomRepository};

use super::{dependency_failure, publish_event};

/// Command to record `vote` for the calling participant.
#[derive(Debug, Clone)]
pub struct CastVoteCommand {
    pub caller: ParticipantIdentity,
    pub vote: String,
}

/// Handler for casting votes.
///
/// Only `latest_vote` is written; concurrent changes to other fields of
/// the participant are preserved.
pub struct CastVoteHandler {
    repository: Arc<dyn RoomRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CastVoteHandler {
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
        cmd: CastVoteCommand,
        metadata: CommandMetadata,
    ) -> Result<(), RoomError> {
        let vote = Vote::new(cmd.vote)?;
        let caller = cmd.caller;

        self.repository
            .cast_vote(&caller.room_id, &caller.name, &vote)
            .await
            .map_err(|e| match e.code {
                ErrorCode::ParticipantNotFound => {
                    RoomError::participant_not_found(caller.room_id.clone(), caller.name.as_str())
                }
                _ => dependency_failure("cast_vote", e),
            })?;

        let event = ParticipantVoted {
            room_id: caller.room_id.clone(),
            participant_name: caller.name.clone(),
            vote,
        };
        publish_event(self.event_publisher.as_ref(), &event, &caller.name, &metadata).await?;

        tracing::info!(
            room_id = %caller.room_id,
            participant = %caller.name,
            correlation_id = metadata.correlation_id(),
            "vote cast"
        );
        Ok(())
    }
}
