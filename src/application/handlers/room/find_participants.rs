//! FindParticipantsHandler - Query handler listing a room's participants.

use std::sync::Arc;

use crate::domain::room::{Participant, ParticipantIdentity, RoomError};
use crate::ports::RoomRepository;

use super::dependency_failure;

/// Query for every participant in the caller's room.
#[derive(Debug, Clone)]
pub struct FindParticipantsQuery {
    pub caller: ParticipantIdentity,
}

/// Handler for listing participants. Order is unspecified.
pub struct FindParticipantsHandler {
    repository: Arc<dyn RoomRepository>,
}

impl FindParticipantsHandler {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: FindParticipantsQuery) -> Result<Vec<Participant>, RoomError> {
        self.repository
            .find_participants(&query.caller.room_id)
            .await
            .map_err(|e| dependency_failure("find_participants", e))
    }
}
