//! Room fanout events.
//!
//! Each struct serializes to exactly the payload subscribers receive; the
//! topic is the `event_type`:
//! - `ParticipantJoined` - `{room_id, participant_name}`
//! - `ParticipantVoted` - `{room_id, participant_name, vote}`
//! - `RevealVotes` - `{room_id}`
//! - `ResetVotes` - `{room_id}`

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{domain_event, ParticipantName, RoomId, Vote};

/// Topic names, in the order a room usually sees them.
pub const ROOM_TOPICS: [&str; 4] = [
    ParticipantJoined::TOPIC,
    ParticipantVoted::TOPIC,
    RevealVotes::TOPIC,
    ResetVotes::TOPIC,
];

// ════════════════════════════════════════════════════════════════════════════
// ParticipantJoined
// ════════════════════════════════════════════════════════════════════════════

/// Published when a non-admin participant joins a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantJoined {
    pub room_id: RoomId,
    pub participant_name: ParticipantName,
}

impl ParticipantJoined {
    pub const TOPIC: &'static str = "ParticipantJoined";
}

domain_event!(
    ParticipantJoined,
    event_type = ParticipantJoined::TOPIC,
    aggregate_id = room_id,
    aggregate_type = "Room"
);

// ════════════════════════════════════════════════════════════════════════════
// ParticipantVoted
// ════════════════════════════════════════════════════════════════════════════

/// Published when a participant casts or changes a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantVoted {
    pub room_id: RoomId,
    pub participant_name: ParticipantName,
    pub vote: Vote,
}

impl ParticipantVoted {
    pub const TOPIC: &'static str = "ParticipantVoted";
}

domain_event!(
    ParticipantVoted,
    event_type = ParticipantVoted::TOPIC,
    aggregate_id = room_id,
    aggregate_type = "Room"
);

// ════════════════════════════════════════════════════════════════════════════
// RevealVotes
// ════════════════════════════════════════════════════════════════════════════

/// Published when the admin reveals the room's votes. No state changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealVotes {
    pub room_id: RoomId,
}

impl RevealVotes {
    pub const TOPIC: &'static str = "RevealVotes";
}

domain_event!(
    RevealVotes,
    event_type = RevealVotes::TOPIC,
    aggregate_id = room_id,
    aggregate_type = "Room"
);

// ════════════════════════════════════════════════════════════════════════════
// ResetVotes
// ════════════════════════════════════════════════════════════════════════════

/// Published after every participant's vote in the room was cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetVotes {
    pub room_id: RoomId,
}

impl ResetVotes {
    pub const TOPIC: &'static str = "ResetVotes";
}

domain_event!(
    ResetVotes,
    event_type = ResetVotes::TOPIC,
    aggregate_id = room_id,
    aggregate_type = "Room"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SerializableDomainEvent;
    use serde_json::json;

    fn room_id() -> RoomId {
        RoomId::parse("aB3xY9").unwrap()
    }

    #[test]
    fn participant_voted_payload_matches_schema() {
        let event = ParticipantVoted {
            room_id: room_id(),
            participant_name: ParticipantName::new("Bob").unwrap(),
            vote: Vote::new("5").unwrap(),
        };
        let envelope = event.to_envelope().unwrap();

        assert_eq!(envelope.event_type, "ParticipantVoted");
        assert_eq!(envelope.aggregate_id, "aB3xY9");
        assert_eq!(
            envelope.payload,
            json!({"room_id": "aB3xY9", "participant_name": "Bob", "vote": "5"})
        );
    }

    #[test]
    fn room_level_events_carry_only_the_room() {
        let reveal = RevealVotes { room_id: room_id() }.to_envelope().unwrap();
        let reset = ResetVotes { room_id: room_id() }.to_envelope().unwrap();

        assert_eq!(reveal.payload, json!({"room_id": "aB3xY9"}));
        assert_eq!(reset.event_type, "ResetVotes");
        assert_eq!(reset.aggregate_type, "Room");
    }

    #[test]
    fn topics_are_distinct() {
        let mut topics = ROOM_TOPICS.to_vec();
        topics.sort();
        topics.dedup();
        assert_eq!(topics.len(), 4);
    }
}
