//! Room command and query handlers.
//!
//! One handler per use case. Each is built from mandatory port
//! dependencies, so a handler that exists is fully wired.
//!
//! | Handler | Caller | Emits |
//! |---|---|---|
//! | `HostRoomHandler` | anyone | - |
//! | `FindRoomHandler` | anyone with a room code | - |
//! | `JoinRoomHandler` | anyone with a room code | `ParticipantJoined` |
//! | `CastVoteHandler` | participant | `ParticipantVoted` |
//! | `RevealVotesHandler` | admin | `RevealVotes` |
//! | `ResetVotesHandler` | admin | `ResetVotes` |
//! | `FindParticipantsHandler` | participant | - |

mod cast_vote;
mod find_participants;
mod find_room;
mod host_room;
mod join_room;
mod reset_votes;
mod reveal_votes;

pub use cast_vote::{CastVoteCommand, CastVoteHandler};
pub use find_participants::{FindParticipantsHandler, FindParticipantsQuery};
pub use find_room::{FindRoomHandler, FindRoomQuery};
pub use host_room::{HostRoomCommand, HostRoomHandler, HostRoomResult};
pub use join_room::{JoinRoomCommand, JoinRoomHandler, JoinRoomResult};
pub use reset_votes::{ResetVotesCommand, ResetVotesHandler};
pub use reveal_votes::{RevealVotesCommand, RevealVotesHandler};

use crate::domain::foundation::{
    CommandMetadata, DomainError, ParticipantName, RoomId, SerializableDomainEvent,
};
use crate::domain::room::RoomError;
use crate::ports::EventPublisher;

/// Log a failed port call and convert it for the caller.
fn dependency_failure(operation: &'static str, err: DomainError) -> RoomError {
    tracing::error!(operation, code = %err.code, error = %err, "dependency call failed");
    RoomError::from(err)
}

/// Parse a client-supplied room code.
///
/// A blank code is a validation error. A code that could never have been
/// generated is reported as not found without touching the store.
fn parse_room_code(raw: &str) -> Result<RoomId, RoomError> {
    let room_id = RoomId::parse(raw)?;
    if !room_id.is_well_formed() {
        return Err(RoomError::room_not_found(room_id));
    }
    Ok(room_id)
}

/// Wrap `event` in an envelope carrying the request's correlation id and
/// publish it. The preceding store mutation is not rolled back on failure.
async fn publish_event<E: SerializableDomainEvent>(
    publisher: &dyn EventPublisher,
    event: &E,
    actor: &ParticipantName,
    metadata: &CommandMetadata,
) -> Result<(), RoomError> {
    let envelope = event
        .to_envelope()
        .map_err(|e| dependency_failure("publish", e))?
        .with_correlation_id(metadata.correlation_id())
        .with_actor(actor.as_str());

    publisher
        .publish(envelope)
        .await
        .map_err(|e| dependency_failure("publish", e))?;

    tracing::debug!(
        event_type = event.event_type(),
        room_id = %event.aggregate_id(),
        "published room event"
    );
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use async_trait::async_trait;
    use secrecy::SecretString;

    use crate::adapters::auth::{JwtCredentialService, DEFAULT_TOKEN_TTL_SECS};
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::storage::InMemoryRoomRepository;
    use crate::domain::foundation::{
        CommandMetadata, DomainError, ErrorCode, EventEnvelope, ParticipantName, RoomId, Vote,
    };
    use crate::domain::room::{Participant, ParticipantIdentity, Room};
    use crate::ports::{EventPublisher, RoomRepository};

    pub const TEST_SECRET: &str = "fixture-secret-with-enough-bytes-1234";

    /// In-memory ports shared by the handler tests.
    pub struct Harness {
        pub repo: Arc<InMemoryRoomRepository>,
        pub bus: Arc<InMemoryEventBus>,
        pub credentials: Arc<JwtCredentialService>,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                repo: Arc::new(InMemoryRoomRepository::new()),
                bus: Arc::new(InMemoryEventBus::recording()),
                credentials: Arc::new(JwtCredentialService::new(
                    &SecretString::new(TEST_SECRET.to_string()),
                    DEFAULT_TOKEN_TTL_SECS,
                )),
            }
        }

        /// A room with `admin` as its admin and `others` as plain participants.
        pub async fn room_with(&self, admin: &str, others: &[&str]) -> Room {
            let room = self.repo.create_room().await.unwrap();
            self.repo
                .create_participant(room.id(), &name(admin), true)
                .await
                .unwrap();
            for other in others {
                self.repo
                    .create_participant(room.id(), &name(other), false)
                    .await
                    .unwrap();
            }
            room
        }

        pub async fn participant(&self, room: &Room, who: &str) -> Option<Participant> {
            self.repo.find_participant(room.id(), &name(who)).await.unwrap()
        }
    }

    pub fn name(s: &str) -> ParticipantName {
        ParticipantName::new(s).unwrap()
    }

    pub fn identity(room: &Room, who: &str, is_admin: bool) -> ParticipantIdentity {
        ParticipantIdentity::new(room.id().clone(), name(who), is_admin)
    }

    pub fn metadata() -> CommandMetadata {
        CommandMetadata::new().with_correlation_id("test-correlation")
    }

    /// Publisher whose every call fails.
    pub struct FailingPublisher;

    #[async_trait]
    impl EventPublisher for FailingPublisher {
        async fn publish(&self, _event: EventEnvelope) -> Result<(), DomainError> {
            Err(DomainError::new(
                ErrorCode::EventPublishError,
                "Simulated publish failure",
            ))
        }
    }

    /// Repository whose every call fails.
    pub struct FailingRepository;

    fn down() -> DomainError {
        DomainError::database("Simulated store failure")
    }

    #[async_trait]
    impl RoomRepository for FailingRepository {
        async fn create_room(&self) -> Result<Room, DomainError> {
            Err(down())
        }
        async fn create_participant(
            &self,
            _room_id: &RoomId,
            _name: &ParticipantName,
            _is_admin: bool,
        ) -> Result<Participant, DomainError> {
            Err(down())
        }
        async fn find_room(&self, _room_id: &RoomId) -> Result<Option<Room>, DomainError> {
            Err(down())
        }
        async fn find_participant(
            &self,
            _room_id: &RoomId,
            _name: &ParticipantName,
        ) -> Result<Option<Participant>, DomainError> {
            Err(down())
        }
        async fn find_participants(
            &self,
            _room_id: &RoomId,
        ) -> Result<Vec<Participant>, DomainError> {
            Err(down())
        }
        async fn cast_vote(
            &self,
            _room_id: &RoomId,
            _name: &ParticipantName,
            _vote: &Vote,
        ) -> Result<(), DomainError> {
            Err(down())
        }
        async fn clear_vote(
            &self,
            _room_id: &RoomId,
            _name: &ParticipantName,
        ) -> Result<(), DomainError> {
            Err(down())
        }
    }
}
