//! EstimateX - Real-time planning poker sessions
//!
//! Hosts estimation rooms, lets participants join and vote with signed
//! room credentials, and fans room events out to live WebSocket clients.
//!
//! Layout follows ports and adapters:
//! - `domain` - Rooms, participants, events and value objects
//! - `ports` - Traits at every external seam
//! - `application` - One handler per use case, plus the notification relay
//! - `adapters` - Redis, JWT, axum and WebSocket implementations
//! - `config` - Environment-driven configuration

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
