//! Room repository port.
//!
//! Rooms and participants share one keyspace partitioned by room id, so
//! "does room X exist", "does participant Y exist in room X" and "every
//! participant in room X" are all single lookups in the adapter.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ParticipantName, RoomId, Vote};
use crate::domain::room::{Participant, Room};

/// Repository port for rooms and their participants.
///
/// Every call is bounded by the adapter's configured deadline; a call that
/// runs out of time fails with `ErrorCode::Timeout`. Nothing is retried.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Create a room under a freshly generated, unused id.
    ///
    /// Claiming the id is atomic: two concurrent calls never receive the
    /// same room.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure or when no free id was found
    async fn create_room(&self) -> Result<Room, DomainError>;

    /// Create or overwrite the participant `(room_id, name)`.
    ///
    /// This is an unconditional upsert. Callers that need "create only if
    /// absent" check with `find_participant` first.
    async fn create_participant(
        &self,
        room_id: &RoomId,
        name: &ParticipantName,
        is_admin: bool,
    ) -> Result<Participant, DomainError>;

    /// Returns `None` if the room does not exist.
    async fn find_room(&self, room_id: &RoomId) -> Result<Option<Room>, DomainError>;

    /// Returns `None` if the participant does not exist in the room.
    async fn find_participant(
        &self,
        room_id: &RoomId,
        name: &ParticipantName,
    ) -> Result<Option<Participant>, DomainError>;

    /// All participants of a room, in no guaranteed order.
    async fn find_participants(&self, room_id: &RoomId) -> Result<Vec<Participant>, DomainError>;

    /// Set `latest_vote` on an existing participant, leaving other fields alone.
    ///
    /// # Errors
    ///
    /// - `ParticipantNotFound` if there is no such participant
    /// - `DatabaseError` on persistence failure
    async fn cast_vote(
        &self,
        room_id: &RoomId,
        name: &ParticipantName,
        vote: &Vote,
    ) -> Result<(), DomainError>;

    /// Reset `latest_vote` to `""` on an existing participant.
    ///
    /// # Errors
    ///
    /// - `ParticipantNotFound` if there is no such participant
    /// - `DatabaseError` on persistence failure
    async fn clear_vote(&self, room_id: &RoomId, name: &ParticipantName)
        -> Result<(), DomainError>;
}
