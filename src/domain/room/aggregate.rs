//! Room and participant entities.
//!
//! A room is a voting session container. Participants live only inside a
//! room and are keyed by `(room_id, name)`. The room's voting state
//! (open or revealed) is never stored; it is implied by the sequence of
//! reveal and reset events.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ParticipantName, RoomId, Timestamp, Vote};

/// A voting session container identified by a short public code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    id: RoomId,
    created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ended_at: Option<Timestamp>,
}

impl Room {
    /// Opens a new room under an already-claimed id.
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            created_at: Timestamp::now(),
            ended_at: None,
        }
    }

    /// Reconstitute a room from persistence.
    pub fn reconstitute(id: RoomId, created_at: Timestamp, ended_at: Option<Timestamp>) -> Self {
        Self {
            id,
            created_at,
            ended_at,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn ended_at(&self) -> Option<&Timestamp> {
        self.ended_at.as_ref()
    }

    /// True once the room has been closed. Nothing closes rooms yet.
    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }
}

/// A named member of a room.
///
/// # Invariants
///
/// - `latest_vote` is `""` both before the first vote and after a reset
/// - at most one participant per room is created with `is_admin = true`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    room_id: RoomId,
    name: ParticipantName,
    is_admin: bool,
    #[serde(default)]
    latest_vote: String,
    created_at: Timestamp,
}

impl Participant {
    /// Creates a participant with no vote cast.
    pub fn new(room_id: RoomId, name: ParticipantName, is_admin: bool) -> Self {
        Self {
            room_id,
            name,
            is_admin,
            latest_vote: String::new(),
            created_at: Timestamp::now(),
        }
    }

    /// Reconstitute a participant from persistence (no validation).
    pub fn reconstitute(
        room_id: RoomId,
        name: ParticipantName,
        is_admin: bool,
        latest_vote: String,
        created_at: Timestamp,
    ) -> Self {
        Self {
            room_id,
            name,
            is_admin,
            latest_vote,
            created_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn name(&self) -> &ParticipantName {
        &self.name
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin
    }

    /// The last vote cast, or `""` when none is pending.
    pub fn latest_vote(&self) -> &str {
        &self.latest_vote
    }

    pub fn has_voted(&self) -> bool {
        !self.latest_vote.is_empty()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    pub fn record_vote(&mut self, vote: &Vote) {
        self.latest_vote = vote.as_str().to_string();
    }

    pub fn clear_vote(&mut self) {
        self.latest_vote.clear();
    }
}
