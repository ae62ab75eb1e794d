//! In-Memory Room Repository
//!
//! Rooms and participants held in maps keyed by room id. Claiming an id
//! and upserting a participant each happen under one write lock, so the
//! adapter honours the same atomicity as the Redis one. As in Redis, the
//! room record and its participants are stored independently.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, ParticipantName, RoomId, Vote};
use crate::domain::room::{Participant, Room};
use crate::ports::RoomRepository;

use super::{default_id_source, RoomIdSource, MAX_ROOM_ID_ATTEMPTS};

#[derive(Debug, Default)]
struct Keyspace {
    rooms: HashMap<RoomId, Room>,
    participants: HashMap<RoomId, HashMap<ParticipantName, Participant>>,
}

impl Keyspace {
    fn participant_mut(
        &mut self,
        room_id: &RoomId,
        name: &ParticipantName,
    ) -> Result<&mut Participant, DomainError> {
        self.participants
            .get_mut(room_id)
            .and_then(|members| members.get_mut(name))
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::ParticipantNotFound,
                    format!("participant {} not found in room {}", name, room_id),
                )
            })
    }
}

/// In-memory storage for rooms and participants.
#[derive(Clone)]
pub struct InMemoryRoomRepository {
    keyspace: Arc<RwLock<Keyspace>>,
    id_source: Arc<Mutex<RoomIdSource>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::with_id_source(default_id_source())
    }

    /// Use a custom candidate-id generator.
    pub fn with_id_source(id_source: RoomIdSource) -> Self {
        Self {
            keyspace: Arc::new(RwLock::new(Keyspace::default())),
            id_source: Arc::new(Mutex::new(id_source)),
        }
    }

    /// Number of rooms stored.
    pub async fn room_count(&self) -> usize {
        self.keyspace.read().await.rooms.len()
    }

    fn next_candidate(&self) -> RoomId {
        let mut source = self.id_source.lock().unwrap_or_else(PoisonError::into_inner);
        (*source)()
    }
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryRoomRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRoomRepository").finish_non_exhaustive()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(&self) -> Result<Room, DomainError> {
        for _ in 0..MAX_ROOM_ID_ATTEMPTS {
            let candidate = self.next_candidate();
            let mut keyspace = self.keyspace.write().await;
            if keyspace.rooms.contains_key(&candidate) {
                tracing::debug!(room_id = %candidate, "room id collision, retrying");
                continue;
            }
            let room = Room::new(candidate.clone());
            keyspace.rooms.insert(candidate, room.clone());
            return Ok(room);
        }

        Err(DomainError::database(format!(
            "no free room id after {} attempts",
            MAX_ROOM_ID_ATTEMPTS
        )))
    }

    async fn create_participant(
        &self,
        room_id: &RoomId,
        name: &ParticipantName,
        is_admin: bool,
    ) -> Result<Participant, DomainError> {
        let participant = Participant::new(room_id.clone(), name.clone(), is_admin);
        self.keyspace
            .write()
            .await
            .participants
            .entry(room_id.clone())
            .or_default()
            .insert(name.clone(), participant.clone());
        Ok(participant)
    }

    async fn find_room(&self, room_id: &RoomId) -> Result<Option<Room>, DomainError> {
        Ok(self.keyspace.read().await.rooms.get(room_id).cloned())
    }

    async fn find_participant(
        &self,
        room_id: &RoomId,
        name: &ParticipantName,
    ) -> Result<Option<Participant>, DomainError> {
        let keyspace = self.keyspace.read().await;
        Ok(keyspace
            .participants
            .get(room_id)
            .and_then(|members| members.get(name))
            .cloned())
    }

    async fn find_participants(&self, room_id: &RoomId) -> Result<Vec<Participant>, DomainError> {
        let keyspace = self.keyspace.read().await;
        Ok(keyspace
            .participants
            .get(room_id)
            .map(|members| members.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn cast_vote(
        &self,
        room_id: &RoomId,
        name: &ParticipantName,
        vote: &Vote,
    ) -> Result<(), DomainError> {
        let mut keyspace = self.keyspace.write().await;
        keyspace.participant_mut(room_id, name)?.record_vote(vote);
        Ok(())
    }

    async fn clear_vote(
        &self,
        room_id: &RoomId,
        name: &ParticipantName,
    ) -> Result<(), DomainError> {
        let mut keyspace = self.keyspace.write().await;
        keyspace.participant_mut(room_id, name)?.clear_vote();
        Ok(())
    }
}
