//! Caller identity for authenticated use cases.

use crate::domain::foundation::{ParticipantClaims, ParticipantName, RoomId};

/// Who is calling, as asserted by a verified credential.
///
/// Only identity travels past the authorizer. Nothing here says the
/// participant still exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantIdentity {
    pub room_id: RoomId,
    pub name: ParticipantName,
    pub is_admin: bool,
}

impl ParticipantIdentity {
    pub fn new(room_id: RoomId, name: ParticipantName, is_admin: bool) -> Self {
        Self {
            room_id,
            name,
            is_admin,
        }
    }
}

impl From<ParticipantClaims> for ParticipantIdentity {
    fn from(claims: ParticipantClaims) -> Self {
        Self {
            room_id: claims.room_id,
            name: claims.name,
            is_admin: claims.is_admin,
        }
    }
}
