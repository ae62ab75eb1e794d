//! WebSocket adapters for live room updates.
//!
//! ```text
//! Event fanout ──▶ NotificationRelay ──▶ RoomChannels (PushNotifier)
//!                                            │ broadcast per room
//!                                            ▼
//!                         GET /rooms/:room_id/live connections
//! ```
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`channels`] - Per-room broadcast channels
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod channels;
pub mod handler;
pub mod messages;

pub use channels::{ClientId, RoomChannels, DEFAULT_CHANNEL_CAPACITY};
pub use handler::{live_handler, live_router, LiveQuery, LiveState};
pub use messages::{ClientMessage, PushUpdate, ServerMessage};
