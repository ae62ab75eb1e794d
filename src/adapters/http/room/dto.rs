//! HTTP DTOs for room endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;
use crate::domain::room::{Participant, Room};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to host a new room.
#[derive(Debug, Clone, Deserialize)]
pub struct HostRoomRequest {
    /// Display name of the host.
    pub name: String,
}

/// Request to join an existing room.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinRoomRequest {
    pub room_id: String,
    pub name: String,
}

/// Request to cast a vote.
#[derive(Debug, Clone, Deserialize)]
pub struct CastVoteRequest {
    pub vote: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRoomResponse {
    pub room_id: String,
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub access_token: String,
}

/// Acknowledgement with no payload, serialized as `{}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmptyResponse {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomResponse {
    pub id: String,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<Timestamp>,
}

impl From<Room> for RoomResponse {
    fn from(room: Room) -> Self {
        Self {
            id: room.id().to_string(),
            created_at: *room.created_at(),
            ended_at: room.ended_at().copied(),
        }
    }
}

/// A participant as seen by other room members. An empty `latest_vote`
/// means no vote is cast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantResponse {
    pub room_id: String,
    pub name: String,
    pub is_admin: bool,
    pub latest_vote: String,
    pub created_at: Timestamp,
}

impl From<Participant> for ParticipantResponse {
    fn from(p: Participant) -> Self {
        Self {
            room_id: p.room_id().to_string(),
            name: p.name().to_string(),
            is_admin: p.is_admin(),
            latest_vote: p.latest_vote().to_string(),
            created_at: *p.created_at(),
        }
    }
}
