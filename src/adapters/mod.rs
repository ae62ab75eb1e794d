//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `auth` - JWT credential service
//! - `events` - Event bus implementations (in-memory, Redis pub/sub)
//! - `http` - axum routes, authorizer and error mapping
//! - `storage` - Room repositories (in-memory, Redis)
//! - `websocket` - Live room channels

pub mod auth;
pub mod events;
pub mod http;
pub mod storage;
pub mod websocket;

pub use auth::JwtCredentialService;
pub use events::{InMemoryEventBus, RedisEventListener, RedisEventPublisher};
pub use storage::{InMemoryRoomRepository, RedisRoomRepository};
pub use websocket::RoomChannels;
