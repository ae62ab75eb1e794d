//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Commands (host, join, vote, reveal, reset) mutate the store and publish
//! fanout events; queries (find room, find participants) only read.

pub mod handlers;

pub use handlers::{
    // Room use cases
    CastVoteCommand, CastVoteHandler, FindParticipantsHandler, FindParticipantsQuery,
    FindRoomHandler, FindRoomQuery, HostRoomCommand, HostRoomHandler, HostRoomResult,
    JoinRoomCommand, JoinRoomHandler, JoinRoomResult, ResetVotesCommand, ResetVotesHandler,
    RevealVotesCommand, RevealVotesHandler,
    // Event handlers
    NotificationRelay,
};
