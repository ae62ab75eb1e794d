//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, credentials, event infrastructure
//! and error types that form the vocabulary of the EstimateX domain.

mod auth;
mod command;
mod errors;
mod events;
mod ids;
mod timestamp;
mod vote;

pub use auth::{AccessToken, AuthError, ParticipantClaims};
pub use command::CommandMetadata;
pub use crate::domain_event;
pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{
    DomainEvent, EventEnvelope, EventId, EventMetadata, SerializableDomainEvent,
};
pub use ids::{ParticipantName, RoomId, MAX_NAME_LENGTH, ROOM_ID_LENGTH};
pub use timestamp::Timestamp;
pub use vote::{Vote, MAX_VOTE_LENGTH};
