//! Storage Adapters
//!
//! Implementations of the `RoomRepository` port.
//!
//! ## Available Adapters
//!
//! - **InMemoryRoomRepository** - Keeps rooms in process memory (testing/development)
//! - **RedisRoomRepository** - Stores rooms in Redis, shared across instances
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{InMemoryRoomRepository, RedisRoomRepository};
//!
//! // Production: Redis
//! let repo = RedisRoomRepository::connect(&config.redis).await?;
//!
//! // Testing: in-memory
//! let repo = InMemoryRoomRepository::new();
//! ```

mod in_memory;
mod redis_store;

pub use in_memory::InMemoryRoomRepository;
pub use redis_store::RedisRoomRepository;

use crate::domain::foundation::RoomId;

/// How many candidate ids `create_room` tries before giving up.
pub const MAX_ROOM_ID_ATTEMPTS: usize = 32;

/// Produces candidate room ids. Swappable so tests can force collisions.
pub type RoomIdSource = Box<dyn FnMut() -> RoomId + Send>;

pub(crate) fn default_id_source() -> RoomIdSource {
    Box::new(RoomId::generate)
}
