//! Redis-backed room repository for multi-instance deployments.
//!
//! # Key Patterns
//!
//! - `{prefix}room:{id}` - Room record (JSON), claimed with `SET NX`
//! - `{prefix}room:{id}:participant:{name}` - Participant record (HASH)
//! - `{prefix}room:{id}:participants` - Names of the room's participants (SET)
//!
//! Every key of a room shares the `{prefix}room:{id}` stem, so one room's
//! data is a single contiguous slice of the keyspace.
//!
//! The `MultiplexedConnection` is cheap to clone and safe to use
//! concurrently; each call clones it instead of locking.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client, Script};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

use crate::config::RedisConfig;
use crate::domain::foundation::{
    DomainError, ErrorCode, ParticipantName, RoomId, Timestamp, Vote,
};
use crate::domain::room::{Participant, Room};
use crate::ports::RoomRepository;

use super::{default_id_source, RoomIdSource, MAX_ROOM_ID_ATTEMPTS};

/// Sets `latest_vote` only if the participant hash exists.
///
/// KEYS[1] = participant key, ARGV[1] = vote ("" clears).
/// Returns 1 on update, 0 when the participant is missing.
const SET_VOTE_IF_EXISTS: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
redis.call('HSET', KEYS[1], 'latest_vote', ARGV[1])
return 1
"#;

/// Redis room repository.
#[derive(Clone)]
pub struct RedisRoomRepository {
    conn: MultiplexedConnection,
    key_prefix: String,
    timeout: Duration,
    set_vote_script: Script,
    id_source: Arc<Mutex<RoomIdSource>>,
}

impl RedisRoomRepository {
    /// Wrap an established connection.
    pub fn new(conn: MultiplexedConnection, key_prefix: impl Into<String>, timeout: Duration) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
            timeout,
            set_vote_script: Script::new(SET_VOTE_IF_EXISTS),
            id_source: Arc::new(Mutex::new(default_id_source())),
        }
    }

    /// Open a client and connect using the redis section of the config.
    ///
    /// # Errors
    ///
    /// `DatabaseError` if the URL is invalid or the server is unreachable,
    /// `Timeout` if connecting takes longer than the configured timeout.
    pub async fn connect(config: &RedisConfig) -> Result<Self, DomainError> {
        // The URL may carry credentials, so it is never logged
        let client = Client::open(config.url.as_str()).map_err(|e| {
            error!(error = %e, "failed to open Redis client");
            DomainError::database(format!("failed to open Redis client: {}", e))
        })?;

        let conn = match tokio::time::timeout(
            config.timeout(),
            client.get_multiplexed_tokio_connection(),
        )
        .await
        {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => {
                error!(error = %e, "failed to connect to Redis");
                return Err(DomainError::database(format!(
                    "failed to connect to Redis: {}",
                    e
                )));
            }
            Err(_) => return Err(DomainError::timeout("redis connect")),
        };

        Ok(Self::new(conn, config.key_prefix.clone(), config.timeout()))
    }

    /// Use a custom candidate-id generator.
    pub fn with_id_source(mut self, id_source: RoomIdSource) -> Self {
        self.id_source = Arc::new(Mutex::new(id_source));
        self
    }

    // ─────────────────────────────────────────────────────────────────────
    // Keys
    // ─────────────────────────────────────────────────────────────────────

    fn room_key(&self, room_id: &RoomId) -> String {
        format!("{}room:{}", self.key_prefix, room_id)
    }

    fn participant_key(&self, room_id: &RoomId, name: &str) -> String {
        format!("{}room:{}:participant:{}", self.key_prefix, room_id, name)
    }

    fn index_key(&self, room_id: &RoomId) -> String {
        format!("{}room:{}:participants", self.key_prefix, room_id)
    }

    /// Run one Redis call under the configured deadline.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, DomainError>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                error!(operation, error = %e, "redis call failed");
                Err(DomainError::database(format!("{} failed: {}", operation, e)))
            }
            Err(_) => {
                warn!(operation, timeout_ms = self.timeout.as_millis() as u64, "redis call timed out");
                Err(DomainError::timeout(operation))
            }
        }
    }

    fn next_candidate(&self) -> RoomId {
        let mut source = self.id_source.lock().unwrap_or_else(PoisonError::into_inner);
        (*source)()
    }

    async fn set_vote(
        &self,
        operation: &'static str,
        room_id: &RoomId,
        name: &ParticipantName,
        value: &str,
    ) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        let key = self.participant_key(room_id, name.as_str());
        let mut invocation = self.set_vote_script.key(&key);
        invocation.arg(value);

        let updated: i64 = self
            .bounded(operation, invocation.invoke_async(&mut conn))
            .await?;

        if updated == 0 {
            return Err(DomainError::new(
                ErrorCode::ParticipantNotFound,
                format!("participant {} not found in room {}", name, room_id),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Debug for RedisRoomRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRoomRepository")
            .field("key_prefix", &self.key_prefix)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Participant hash encoding
// ─────────────────────────────────────────────────────────────────────────

fn participant_fields(participant: &Participant) -> [(&'static str, String); 5] {
    [
        ("room_id", participant.room_id().to_string()),
        ("name", participant.name().to_string()),
        ("is_admin", participant.is_admin().to_string()),
        ("latest_vote", participant.latest_vote().to_string()),
        ("created_at", participant.created_at().to_rfc3339()),
    ]
}

fn participant_from_fields(fields: &HashMap<String, String>) -> Result<Participant, DomainError> {
    let field = |name: &str| {
        fields
            .get(name)
            .ok_or_else(|| DomainError::database(format!("participant record missing {}", name)))
    };

    let room_id = RoomId::parse(field("room_id")?.as_str())
        .map_err(|e| DomainError::database(format!("corrupt participant record: {}", e)))?;
    let name = ParticipantName::new(field("name")?.as_str())
        .map_err(|e| DomainError::database(format!("corrupt participant record: {}", e)))?;
    let is_admin = match field("is_admin")?.as_str() {
        "true" => true,
        "false" => false,
        other => {
            return Err(DomainError::database(format!(
                "corrupt participant record: is_admin={}",
                other
            )))
        }
    };
    let latest_vote = fields.get("latest_vote").cloned().unwrap_or_default();
    let created_at = Timestamp::parse_rfc3339(field("created_at")?)
        .ok_or_else(|| DomainError::database("corrupt participant record: created_at"))?;

    Ok(Participant::reconstitute(
        room_id,
        name,
        is_admin,
        latest_vote,
        created_at,
    ))
}

#[async_trait]
impl RoomRepository for RedisRoomRepository {
    #[instrument(skip_all)]
    async fn create_room(&self) -> Result<Room, DomainError> {
        for attempt in 1..=MAX_ROOM_ID_ATTEMPTS {
            let room = Room::new(self.next_candidate());
            let json = serde_json::to_string(&room).map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("failed to serialize room: {}", e),
                )
            })?;

            let mut conn = self.conn.clone();
            let key = self.room_key(room.id());
            let claimed: Option<String> = self
                .bounded(
                    "create_room",
                    redis::cmd("SET")
                        .arg(&key)
                        .arg(&json)
                        .arg("NX")
                        .query_async(&mut conn),
                )
                .await?;

            if claimed.is_some() {
                debug!(room_id = %room.id(), attempt, "claimed room id");
                return Ok(room);
            }
            debug!(room_id = %room.id(), attempt, "room id collision, retrying");
        }

        error!(attempts = MAX_ROOM_ID_ATTEMPTS, "no free room id");
        Err(DomainError::database(format!(
            "no free room id after {} attempts",
            MAX_ROOM_ID_ATTEMPTS
        )))
    }

    #[instrument(skip_all, fields(room_id = %room_id, participant = %name))]
    async fn create_participant(
        &self,
        room_id: &RoomId,
        name: &ParticipantName,
        is_admin: bool,
    ) -> Result<Participant, DomainError> {
        let participant = Participant::new(room_id.clone(), name.clone(), is_admin);
        let key = self.participant_key(room_id, name.as_str());
        let index = self.index_key(room_id);

        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        pipe.atomic()
            .del(&key)
            .ignore()
            .hset_multiple(&key, &participant_fields(&participant))
            .ignore()
            .sadd(&index, name.as_str())
            .ignore();

        self.bounded::<(), _>("create_participant", pipe.query_async(&mut conn))
            .await?;

        Ok(participant)
    }

    #[instrument(skip_all, fields(room_id = %room_id))]
    async fn find_room(&self, room_id: &RoomId) -> Result<Option<Room>, DomainError> {
        let mut conn = self.conn.clone();
        let key = self.room_key(room_id);
        let json: Option<String> = self.bounded("find_room", conn.get(&key)).await?;

        json.map(|json| {
            serde_json::from_str(&json)
                .map_err(|e| DomainError::database(format!("corrupt room record: {}", e)))
        })
        .transpose()
    }

    #[instrument(skip_all, fields(room_id = %room_id, participant = %name))]
    async fn find_participant(
        &self,
        room_id: &RoomId,
        name: &ParticipantName,
    ) -> Result<Option<Participant>, DomainError> {
        let mut conn = self.conn.clone();
        let key = self.participant_key(room_id, name.as_str());
        let fields: HashMap<String, String> =
            self.bounded("find_participant", conn.hgetall(&key)).await?;

        if fields.is_empty() {
            return Ok(None);
        }
        participant_from_fields(&fields).map(Some)
    }

    #[instrument(skip_all, fields(room_id = %room_id))]
    async fn find_participants(&self, room_id: &RoomId) -> Result<Vec<Participant>, DomainError> {
        let mut conn = self.conn.clone();
        let names: Vec<String> = self
            .bounded("find_participants", conn.smembers(self.index_key(room_id)))
            .await?;

        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipe = redis::pipe();
        for name in &names {
            pipe.hgetall(self.participant_key(room_id, name));
        }
        let records: Vec<HashMap<String, String>> = self
            .bounded("find_participants", pipe.query_async(&mut conn))
            .await?;

        records
            .iter()
            // An index entry without a record is skipped
            .filter(|fields| !fields.is_empty())
            .map(participant_from_fields)
            .collect()
    }

    #[instrument(skip_all, fields(room_id = %room_id, participant = %name))]
    async fn cast_vote(
        &self,
        room_id: &RoomId,
        name: &ParticipantName,
        vote: &Vote,
    ) -> Result<(), DomainError> {
        self.set_vote("cast_vote", room_id, name, vote.as_str()).await
    }

    #[instrument(skip_all, fields(room_id = %room_id, participant = %name))]
    async fn clear_vote(
        &self,
        room_id: &RoomId,
        name: &ParticipantName,
    ) -> Result<(), DomainError> {
        self.set_vote("clear_vote", room_id, name, "").await
    }
}
