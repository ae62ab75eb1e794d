//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the use cases and the outside world. Adapters implement these ports.
//!
//! ## Storage
//!
//! - `RoomRepository` - Rooms and participants
//!
//! ## Identity
//!
//! - `CredentialService` - Issue and verify participant credentials
//!
//! ## Event Ports
//!
//! - `EventPublisher` - Port for publishing fanout events
//! - `EventSubscriber` - Port for subscribing to fanout events
//! - `EventHandler` - Handler that processes incoming events
//! - `PushNotifier` - Real-time delivery to room channels

mod credential_service;
mod event_publisher;
mod event_subscriber;
mod push_notifier;
mod room_repository;

pub use credential_service::CredentialService;
pub use event_publisher::EventPublisher;
pub use event_subscriber::{EventBus, EventHandler, EventSubscriber};
pub use push_notifier::PushNotifier;
pub use room_repository::RoomRepository;
