//! HTTP adapter for room endpoints.
//!
//! - `POST /rooms` - Host a room
//! - `POST /rooms/join` - Join a room
//! - `GET /room` - The caller's room
//! - `GET /participants` - Everyone in the caller's room
//! - `POST /votes` - Cast or change the caller's vote
//! - `POST /votes/reveal` - Reveal votes (admin)
//! - `POST /votes/reset` - Clear every vote (admin)

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use handlers::RoomAppState;
pub use routes::room_router;
