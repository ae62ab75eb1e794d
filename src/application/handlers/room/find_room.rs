//! FindRoomHandler - Query handler for looking up a room by code.

use std::sync::Arc;

use crate::domain::room::{Room, RoomError};
use crate::ports::RoomRepository;

use super::{dependency_failure, parse_room_code};

/// Query for a room by its public code.
#[derive(Debug, Clone)]
pub struct FindRoomQuery {
    pub room_id: String,
}

/// Handler for room lookups.
pub struct FindRoomHandler {
    repository: Arc<dyn RoomRepository>,
}

impl FindRoomHandler {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: FindRoomQuery) -> Result<Room, RoomError> {
        let room_id = parse_room_code(&query.room_id)?;

        self.repository
            .find_room(&room_id)
            .await
            .map_err(|e| dependency_failure("find_room", e))?
            .ok_or_else(|| RoomError::room_not_found(room_id))
    }
}
