//! Room domain module.
//!
//! Rooms, their participants, and the events published when a room's
//! voting state changes.
//!
//! # Events
//!
//! - `ParticipantJoined` - Published when someone joins a room
//! - `ParticipantVoted` - Published when a vote is cast
//! - `RevealVotes` - Published when the admin reveals votes
//! - `ResetVotes` - Published after the admin clears every vote

mod aggregate;
mod errors;
mod events;
mod identity;

pub use aggregate::{Participant, Room};
pub use errors::RoomError;
pub use identity::ParticipantIdentity;
pub use events::{ParticipantJoined, ParticipantVoted, ResetVotes, RevealVotes, ROOM_TOPICS};
