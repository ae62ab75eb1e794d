//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, credentials, errors, events)
//! - `room` - Rooms, participants and their fanout events

pub mod foundation;
pub mod room;
