//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations, plus the
//! event handlers that react to what they publish.

pub mod notification;
pub mod room;

pub use notification::NotificationRelay;
pub use room::{
    CastVoteCommand, CastVoteHandler, FindParticipantsHandler, FindParticipantsQuery,
    FindRoomHandler, FindRoomQuery, HostRoomCommand, HostRoomHandler, HostRoomResult,
    JoinRoomCommand, JoinRoomHandler, JoinRoomResult, ResetVotesCommand, ResetVotesHandler,
    RevealVotesCommand, RevealVotesHandler,
};
