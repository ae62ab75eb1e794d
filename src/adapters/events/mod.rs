//! Event transport adapters.
//!
//! Adapters implement the event publishing and subscribing ports
//! for different environments:
//!
//! - `InMemoryEventBus` - Synchronous, in-process bus for tests and single-instance runs
//! - `RedisEventPublisher` - Publishes envelopes on Redis pub/sub channels
//! - `RedisEventListener` - Background service dispatching Redis messages to handlers

mod in_memory;
mod redis_pubsub;

pub use in_memory::InMemoryEventBus;
pub use redis_pubsub::{RedisEventListener, RedisEventPublisher};
