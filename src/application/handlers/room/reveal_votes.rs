//! RevealVotesHandler - Command handler for revealing a room's votes.

use std::sync::Arc;

use crate::domain::foundation::CommandMetadata;
use crate::domain::room::{ParticipantIdentity, RevealVotes, RoomError};
use crate::ports::EventPublisher;

use super::publish_event;

/// Command to reveal the caller's room.
#[derive(Debug, Clone)]
pub struct RevealVotesCommand {
    pub caller: ParticipantIdentity,
}

/// Handler for revealing votes.
///
/// Revealing changes nothing in the store; the event alone moves clients
/// from voting to revealed.
pub struct RevealVotesHandler {
    event_publisher: Arc<dyn EventPublisher>,
}

impl RevealVotesHandler {
    pub fn new(event_publisher: Arc<dyn EventPublisher>) -> Self {
        Self { event_publisher }
    }

    pub async fn handle(
        &self,
        cmd: RevealVotesCommand,
        metadata: CommandMetadata,
    ) -> Result<(), RoomError> {
        let caller = cmd.caller;
        if !caller.is_admin {
            tracing::warn!(
                room_id = %caller.room_id,
                participant = %caller.name,
                "non-admin tried to reveal votes"
            );
            return Err(RoomError::forbidden());
        }

        let event = RevealVotes {
            room_id: caller.room_id.clone(),
        };
        publish_event(self.event_publisher.as_ref(), &event, &caller.name, &metadata).await?;

        tracing::info!(room_id = %caller.room_id, "votes revealed");
        Ok(())
    }
}
